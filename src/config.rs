//! Application-wide constants and compile-time configuration.
//!
//! Store byte layout, timing parameters, and peripheral addresses
//! live here so they can be tuned in one place.

// Non-volatile config store (AT24C32 EEPROM)

/// Total bytes reserved for the configuration record. `wipe()` zeroes
/// this entire range.
pub const STORE_REGION_SIZE: usize = 512;

/// Byte address of the presence flag (boolean-as-byte).
pub const FLAG_OFFSET: usize = 0;

/// Flag byte value meaning "a record has been committed". Anything
/// else - including the 0xFF of a factory-fresh EEPROM - reads as
/// absent.
pub const RECORD_PRESENT: u8 = 0x01;

/// Byte address of the wheel circumference (1 byte, unsigned, cm).
pub const CIRCUMFERENCE_OFFSET: usize = 1;

/// Byte address of the device-name slot (1 length byte + payload).
pub const DEVICE_NAME_OFFSET: usize = 2;

/// Byte address of the operator-name slot (1 length byte + payload).
pub const OPERATOR_NAME_OFFSET: usize = 100;

/// Declared maximum payload length for each string slot. Each slot
/// reserves this many bytes plus one length byte; writes longer than
/// this are rejected before touching the medium.
pub const NAME_MAX_LEN: usize = 32;

// Removable-storage record source

/// Fixed filename of the provisioning record on the SD card.
pub const RECORD_FILENAME: &str = "info.txt";

/// Read-buffer size for the provisioning record. Three short lines;
/// anything past this is not a valid record.
pub const SOURCE_RECORD_MAX_LEN: usize = 128;

// Control loop timing

/// Control-loop poll interval (ms).
pub const POLL_INTERVAL_MS: u64 = 10;

/// Navigation input must sit released at least this long before the
/// next press counts as an edge.
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Safe-eject confirmation countdown (seconds).
pub const EJECT_COUNTDOWN_SECS: u8 = 10;

/// Factory-reset confirmation countdown (seconds).
pub const RESET_COUNTDOWN_SECS: u8 = 30;

// GPIO / bus assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Nav button     → P0.11 (active-low, internal pull-up)
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   SPI SCK        → P0.19
//   SPI MOSI       → P0.20
//   SPI MISO       → P0.21
//   SD card CS     → P0.17
//   Status LED R   → P0.13
//   Status LED G   → P0.14
//   Status LED B   → P0.15

/// I²C address of the AT24C32 EEPROM (on the DS3231 RTC module).
pub const EEPROM_I2C_ADDR: u8 = 0x57;

/// I²C address of the DS3231 real-time clock.
pub const RTC_I2C_ADDR: u8 = 0x68;

/// AT24C32 write page size (bytes).
pub const EEPROM_PAGE_SIZE: usize = 32;

/// AT24C32 internal write-cycle time (ms). The part NACKs until the
/// cycle completes.
pub const EEPROM_WRITE_CYCLE_MS: u64 = 5;
