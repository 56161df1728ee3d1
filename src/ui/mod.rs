//! Operator interface - OLED display + the navigation button.
//!
//! The control loop owns a page state machine (in the core library);
//! these modules are the hardware ends of it: an SSD1306 wrapper that
//! implements the core's `Frame` contract, and the raw button sampler
//! feeding the core's edge detector.

pub mod buttons;
pub mod display;
