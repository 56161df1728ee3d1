//! AT24C32 I²C EEPROM adapter.
//!
//! The configuration store's 512-byte region sits at the bottom of the
//! 4 KB part that ships on the DS3231 RTC module. Addressing is two
//! bytes big-endian; writes must not cross the 32-byte page boundary,
//! and each page write is followed by the part's internal write cycle
//! (it NACKs until the cycle completes, so we simply wait it out).

use cyclometer::config::{
    EEPROM_I2C_ADDR, EEPROM_PAGE_SIZE, EEPROM_WRITE_CYCLE_MS, STORE_REGION_SIZE,
};
use cyclometer::error::Error;
use cyclometer::store::ConfigMedium;
use embassy_time::{block_for, Duration};
use embedded_hal::i2c::I2c;

pub struct At24c32<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> At24c32<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            addr: EEPROM_I2C_ADDR,
        }
    }

    fn write_page(&mut self, offset: usize, data: &[u8]) -> Result<(), Error> {
        let mut frame = [0u8; 2 + EEPROM_PAGE_SIZE];
        frame[0] = (offset >> 8) as u8;
        frame[1] = offset as u8;
        frame[2..2 + data.len()].copy_from_slice(data);

        self.i2c
            .write(self.addr, &frame[..2 + data.len()])
            .map_err(|_| Error::StoreWrite)?;
        block_for(Duration::from_millis(EEPROM_WRITE_CYCLE_MS));
        Ok(())
    }
}

impl<I2C: I2c> ConfigMedium for At24c32<I2C> {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Error> {
        if offset + buf.len() > STORE_REGION_SIZE {
            return Err(Error::StoreRead);
        }
        let addr = [(offset >> 8) as u8, offset as u8];
        self.i2c
            .write_read(self.addr, &addr, buf)
            .map_err(|_| Error::StoreRead)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Error> {
        if offset + data.len() > STORE_REGION_SIZE {
            return Err(Error::StoreWrite);
        }

        // Split at page boundaries.
        let mut offset = offset;
        let mut data = data;
        while !data.is_empty() {
            let room = EEPROM_PAGE_SIZE - (offset % EEPROM_PAGE_SIZE);
            let chunk = room.min(data.len());
            self.write_page(offset, &data[..chunk])?;
            offset += chunk;
            data = &data[chunk..];
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        // Page writes complete synchronously after the write-cycle
        // wait; there is nothing buffered to flush.
        Ok(())
    }
}
