//! cyclometer - handlebar bicycle computer for nRF52840.
//!
//! Boot sequence: bring up the peripherals, run the configuration
//! bootstrap (EEPROM fast path, or card provisioning with an operator
//! confirm), set the status LED, then enter the 10 ms poll loop that
//! drives page navigation and the guarded countdowns.
//!
//! All the decision logic lives in the `cyclometer` library and is
//! unit-tested on the host; this binary only wires it to hardware.

#![no_std]
#![no_main]

mod hw;
mod ui;

use core::cell::RefCell;

use cyclometer::bootstrap::{self, BootOutcome};
use cyclometer::config::POLL_INTERVAL_MS;
use cyclometer::controller::Controller;
use cyclometer::indicator::Indicator;
use cyclometer::input::PressDetector;
use cyclometer::pages::{self, RideStats};
use cyclometer::store::ConfigStore;
use cyclometer::time::ClockTime;

use defmt::{error, info, warn};
use defmt_rtt as _;
use panic_probe as _;

use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive, Pin};
use embassy_nrf::{bind_interrupts, peripherals, spim, twim};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Duration, Instant, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    SPI2 => spim::InterruptHandler<peripherals::SPI2>;
});

type I2cBus = Mutex<NoopRawMutex, RefCell<twim::Twim<'static, peripherals::TWISPI0>>>;
static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("cyclometer boot");

    // One I²C bus carries the OLED, the EEPROM and the RTC.
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let i2c_bus = I2C_BUS.init(Mutex::new(RefCell::new(i2c)));

    let mut frame = ui::display::Oled::new(I2cDevice::new(i2c_bus));
    let mut rtc = hw::rtc::Ds3231::new(I2cDevice::new(i2c_bus));
    let eeprom = hw::eeprom::At24c32::new(I2cDevice::new(i2c_bus));

    // SD card on SPI.
    let mut spi_config = spim::Config::default();
    spi_config.frequency = spim::Frequency::M8;
    let spi = spim::Spim::new(p.SPI2, Irqs, p.P0_19, p.P0_21, p.P0_20, spi_config);
    let sd_cs = Output::new(p.P0_17.degrade(), Level::High, OutputDrive::Standard);
    // CS is an infallible GPIO; the constructor cannot actually fail.
    let spi_device = ExclusiveDevice::new(spi, sd_cs, Delay).unwrap();
    let sd = embedded_sdmmc::SdCard::new(spi_device, Delay);
    let mut source = hw::sdcard::CardSource::new(sd);

    let mut led = hw::led::StatusLed::new(p.P0_13.degrade(), p.P0_14.degrade(), p.P0_15.degrade());
    led.show(Indicator::Initializing);

    let button = ui::buttons::NavButton::new(p.P0_11.degrade());

    let mut store = match ConfigStore::new(eeprom) {
        Ok(store) => store,
        Err(e) => {
            error!("store layout rejected: {}", e);
            loop {
                pages::draw_fatal(&mut frame, &e);
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    // Ride-logging probe is independent of provisioning: a missing
    // card after first boot only degrades the indicator.
    let logging_ok = source.probe();

    let mut controller = match bootstrap::start(&mut store, &mut source) {
        Ok(BootOutcome::Ready(record)) => {
            info!("config loaded from eeprom");
            Controller::new(record, Indicator::from_boot(logging_ok))
        }
        Ok(BootOutcome::NeedsConfirm(mut record)) => {
            info!("provisioning from card, waiting for confirm");
            pages::draw_confirm(&mut frame, &record);

            let mut confirm = PressDetector::new();
            loop {
                Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
                if confirm.sample(Instant::now().as_millis(), button.is_pressed()) {
                    break;
                }
            }

            match bootstrap::confirm(&mut store, &mut record) {
                Ok(()) => Controller::new(record, Indicator::from_boot(logging_ok)),
                Err(e) => {
                    error!("config commit failed: {}", e);
                    Controller::fatal(e)
                }
            }
        }
        Err(e) => {
            error!("bootstrap failed: {}", e);
            Controller::fatal(e)
        }
    };
    led.show(controller.indicator());

    // TODO: feed these from the wheel-sensor GPIOTE channel once the
    // reed-switch input is wired on the final PCB.
    let stats = RideStats::default();

    let mut time = ClockTime::default();
    let mut rtc_ok = true;

    loop {
        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;

        match rtc.now() {
            Ok(now) => {
                time = now;
                rtc_ok = true;
            }
            Err(_) if rtc_ok => {
                // Keep the last reading; the countdown gate only needs
                // the seconds value to keep moving eventually.
                warn!("rtc read failed, holding last time");
                rtc_ok = false;
            }
            Err(_) => {}
        }

        controller.poll(
            Instant::now().as_millis(),
            &time,
            button.is_pressed(),
            &mut store,
            &stats,
            &mut frame,
        );
        led.show(controller.indicator());
    }
}
