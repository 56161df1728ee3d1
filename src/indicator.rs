//! Status-LED indicator state.

/// Three-colour status signal on the handlebar LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// Power-on until bootstrap resolves.
    Initializing,
    /// Configuration is good but ride logging is unavailable (no
    /// card, or the card failed the probe).
    Degraded,
    /// Fully operational.
    Nominal,
}

impl Indicator {
    /// Indicator for a completed bootstrap.
    pub fn from_boot(logging_ok: bool) -> Self {
        if logging_ok {
            Indicator::Nominal
        } else {
            Indicator::Degraded
        }
    }

    /// (red, green, blue) channel levels for the status LED.
    pub fn channels(self) -> (bool, bool, bool) {
        match self {
            Indicator::Initializing => (false, false, true),
            Indicator::Degraded => (true, false, false),
            Indicator::Nominal => (false, true, false),
        }
    }
}
