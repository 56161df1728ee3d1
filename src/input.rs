//! Navigation-button edge detection.
//!
//! One momentary button, sampled every control-loop pass. A press
//! edge is the released→pressed transition after the input has sat
//! stably released for the debounce interval; holding the button
//! produces no further edges until it is released and settles again.
//! Nothing here blocks - the loop keeps running while the contact
//! bounces.

use crate::config::BUTTON_DEBOUNCE_MS;

pub struct PressDetector {
    last_level: bool,
    stable_since_ms: u64,
    armed: bool,
}

impl PressDetector {
    pub const fn new() -> Self {
        Self {
            last_level: false,
            stable_since_ms: 0,
            armed: false,
        }
    }

    /// Feed one raw sample (`true` = pressed). Returns `true` on a
    /// qualifying press edge - at most once per physical press.
    pub fn sample(&mut self, now_ms: u64, pressed: bool) -> bool {
        let mut edge = false;

        if pressed != self.last_level {
            if pressed && self.armed {
                edge = true;
                self.armed = false;
            }
            self.last_level = pressed;
            self.stable_since_ms = now_ms;
        } else if !pressed && now_ms.saturating_sub(self.stable_since_ms) >= BUTTON_DEBOUNCE_MS {
            self.armed = true;
        }

        edge
    }
}

impl Default for PressDetector {
    fn default() -> Self {
        Self::new()
    }
}
