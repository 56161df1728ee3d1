//! Wall-clock time as read from the DS3231.

/// Calendar date and time of day. Populated from the RTC on target,
/// fabricated directly in host tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl ClockTime {
    /// Seconds elapsed since midnight. Distinct per wall-clock second,
    /// which is all the guarded countdown needs for its tick gate.
    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hours) * 3600 + u32::from(self.minutes) * 60 + u32::from(self.seconds)
    }
}
