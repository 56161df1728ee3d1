//! DS3231 real-time clock reader.

use cyclometer::config::RTC_I2C_ADDR;
use cyclometer::error::Error;
use cyclometer::time::ClockTime;
use embedded_hal::i2c::I2c;

pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Read the current time. The part keeps registers 0x00..0x06 as
    /// BCD: seconds, minutes, hours (24 h mode), weekday, day, month,
    /// year-of-century.
    pub fn now(&mut self) -> Result<ClockTime, Error> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(RTC_I2C_ADDR, &[0x00], &mut regs)
            .map_err(|_| Error::Rtc)?;

        Ok(ClockTime {
            seconds: bcd(regs[0] & 0x7F),
            minutes: bcd(regs[1] & 0x7F),
            hours: bcd(regs[2] & 0x3F),
            day: bcd(regs[4] & 0x3F),
            month: bcd(regs[5] & 0x1F),
            year: 2000 + u16::from(bcd(regs[6])),
        })
    }
}

fn bcd(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}
