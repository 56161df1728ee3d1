//! Navigation-button sampling.
//!
//! One momentary button (active-low with internal pull-up). The
//! control loop samples the raw level every pass; debouncing and edge
//! detection are done by the core's `PressDetector`, so nothing here
//! waits or blocks.

use embassy_nrf::gpio::{AnyPin, Input, Pull};

pub struct NavButton {
    pin: Input<'static>,
}

impl NavButton {
    pub fn new(pin: AnyPin) -> Self {
        Self {
            pin: Input::new(pin, Pull::Up),
        }
    }

    /// Raw pressed level for the edge detector.
    pub fn is_pressed(&self) -> bool {
        self.pin.is_low()
    }
}
