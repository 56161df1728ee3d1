//! SD card record source.
//!
//! The provisioning record is a plain-text `info.txt` in the root of
//! the first FAT volume. Any failure to get as far as an open file
//! handle is reported as the record being absent - a missing card, an
//! unformatted card and a missing file all mean the same thing to the
//! bootstrap: nothing to provision from.

use cyclometer::config::RECORD_FILENAME;
use cyclometer::error::Error;
use cyclometer::loader::RecordSource;
use embedded_sdmmc::{BlockDevice, Mode, TimeSource, Timestamp, VolumeIdx, VolumeManager};

/// Provisioning is read-only, so FAT timestamps never leave the
/// device; a fixed epoch keeps the volume manager happy.
pub struct FixedTime;

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

pub struct CardSource<D: BlockDevice> {
    volume_mgr: VolumeManager<D, FixedTime>,
}

impl<D: BlockDevice> CardSource<D> {
    pub fn new(device: D) -> Self {
        Self {
            volume_mgr: VolumeManager::new(device, FixedTime),
        }
    }

    /// True when the card is reachable and carries a FAT volume -
    /// ride logging can run this session.
    pub fn probe(&mut self) -> bool {
        self.volume_mgr.open_volume(VolumeIdx(0)).is_ok()
    }
}

impl<D: BlockDevice> RecordSource for CardSource<D> {
    fn read_record(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut volume = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(|_| Error::ConfigNotFound)?;
        let mut root = volume.open_root_dir().map_err(|_| Error::ConfigNotFound)?;
        let mut file = root
            .open_file_in_dir(RECORD_FILENAME, Mode::ReadOnly)
            .map_err(|_| Error::ConfigNotFound)?;
        file.read(buf).map_err(|_| Error::ConfigNotFound)
    }
}
