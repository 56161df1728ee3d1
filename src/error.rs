//! Unified error type for cyclometer.
//!
//! We avoid `alloc` - all error variants are fieldless. Implements
//! `defmt::Format` for efficient on-target logging when the `defmt`
//! feature is enabled.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Bootstrap / record source
    /// The provisioning record (`info.txt`) could not be opened at
    /// first boot. Fatal: there is no safe default for wheel
    /// circumference or identity.
    ConfigNotFound,

    /// The provisioning record had fewer than the required fields, or
    /// a field that does not parse.
    MalformedRecord,

    // Config store
    /// A string exceeds its reserved slot in the store layout.
    FieldOverflow,

    /// The field-layout table overlaps itself or exceeds the reserved
    /// region.
    BadLayout,

    /// The non-volatile medium rejected a read.
    StoreRead,

    /// The non-volatile medium rejected a write or commit.
    StoreWrite,

    // Peripherals
    /// I²C transaction to the display failed.
    Display,

    /// RTC read failed.
    Rtc,
}
