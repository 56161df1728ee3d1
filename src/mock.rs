//! In-tree test doubles for the peripheral seams.
//!
//! Host tests (and desktop simulation) stand these in for the EEPROM,
//! the SD card and the OLED. They are ordinary structs, not compiled
//! out, so integration tests can use them too.

use crate::config::STORE_REGION_SIZE;
use crate::error::Error;
use crate::loader::RecordSource;
use crate::pages::Frame;
use crate::store::ConfigMedium;
use heapless::{String, Vec};

/// RAM-backed [`ConfigMedium`].
pub struct RamMedium {
    pub bytes: [u8; STORE_REGION_SIZE],
    /// When set, every write and commit fails with [`Error::StoreWrite`].
    pub fail_writes: bool,
}

impl RamMedium {
    /// A zeroed medium (a wiped store).
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; STORE_REGION_SIZE],
            fail_writes: false,
        }
    }

    /// A medium with every byte set to `fill`. `0xFF` models a
    /// factory-fresh EEPROM.
    pub const fn filled(fill: u8) -> Self {
        Self {
            bytes: [fill; STORE_REGION_SIZE],
            fail_writes: false,
        }
    }

    /// Rebuild from raw bytes (simulated power cycle).
    pub const fn from_bytes(bytes: [u8; STORE_REGION_SIZE]) -> Self {
        Self {
            bytes,
            fail_writes: false,
        }
    }
}

impl Default for RamMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigMedium for RamMedium {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Error> {
        let end = offset.checked_add(buf.len()).ok_or(Error::StoreRead)?;
        if end > STORE_REGION_SIZE {
            return Err(Error::StoreRead);
        }
        buf.copy_from_slice(&self.bytes[offset..end]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Error::StoreWrite);
        }
        let end = offset.checked_add(data.len()).ok_or(Error::StoreWrite)?;
        if end > STORE_REGION_SIZE {
            return Err(Error::StoreWrite);
        }
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Error::StoreWrite);
        }
        Ok(())
    }
}

/// Canned [`RecordSource`] with an invocation counter.
pub struct StaticSource {
    contents: Option<&'static str>,
    /// How many times `read_record` was called.
    pub reads: usize,
}

impl StaticSource {
    /// A source holding the given record text.
    pub const fn with(contents: &'static str) -> Self {
        Self {
            contents: Some(contents),
            reads: 0,
        }
    }

    /// A source with no record file (card missing or blank).
    pub const fn missing() -> Self {
        Self {
            contents: None,
            reads: 0,
        }
    }
}

impl RecordSource for StaticSource {
    fn read_record(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.reads += 1;
        let text = self.contents.ok_or(Error::ConfigNotFound)?;
        let bytes = text.as_bytes();
        if bytes.len() > buf.len() {
            return Err(Error::MalformedRecord);
        }
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
}

/// Recording [`Frame`]: captures printed lines so tests can assert on
/// what a page drew.
#[derive(Default)]
pub struct FrameLog {
    pub lines: Vec<String<32>, 16>,
    pub clears: usize,
    pub commits: usize,
    pub text_size: u8,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any printed line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.as_str().contains(needle))
    }
}

impl Frame for FrameLog {
    fn clear(&mut self) {
        self.lines.clear();
        self.clears += 1;
    }

    fn set_cursor(&mut self, _col: u8, _row: u8) {}

    fn set_text_size(&mut self, size: u8) {
        self.text_size = size;
    }

    fn print_line(&mut self, text: &str) {
        let mut line: String<32> = String::new();
        for c in text.chars().take(32) {
            let _ = line.push(c);
        }
        let _ = self.lines.push(line);
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}
