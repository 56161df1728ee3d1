//! Three-channel status LED.

use cyclometer::indicator::Indicator;
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};

pub struct StatusLed {
    red: Output<'static>,
    green: Output<'static>,
    blue: Output<'static>,
}

impl StatusLed {
    pub fn new(red: AnyPin, green: AnyPin, blue: AnyPin) -> Self {
        Self {
            red: Output::new(red, Level::Low, OutputDrive::Standard),
            green: Output::new(green, Level::Low, OutputDrive::Standard),
            blue: Output::new(blue, Level::Low, OutputDrive::Standard),
        }
    }

    pub fn show(&mut self, indicator: Indicator) {
        let (red, green, blue) = indicator.channels();
        self.red.set_level(level(red));
        self.green.set_level(level(green));
        self.blue.set_level(level(blue));
    }
}

fn level(on: bool) -> Level {
    if on {
        Level::High
    } else {
        Level::Low
    }
}
