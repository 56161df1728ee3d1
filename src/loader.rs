//! Removable-storage config loader.
//!
//! First-boot provisioning reads a plain-text record (`info.txt`) from
//! the SD card: three fields separated by `\n`, in order - wheel
//! circumference (decimal ASCII), device name, operator name. No
//! trailing terminator is required and anything after the third field
//! is ignored.
//!
//! A record with fewer than two separators is malformed and rejected
//! outright; provisioning from a half-written file would silently
//! commit empty identity fields.

use crate::config::NAME_MAX_LEN;
use crate::error::Error;
use crate::store::ConfigRecord;
use heapless::String;

/// Where the provisioning record comes from. The SD card adapter
/// implements this on target; tests feed a canned string.
pub trait RecordSource {
    /// Read the raw record into `buf`, returning the byte count.
    /// [`Error::ConfigNotFound`] when the resource cannot be opened.
    fn read_record(&mut self, buf: &mut [u8]) -> Result<usize, Error>;
}

/// A parsed provisioning record, not yet committed anywhere.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadedRecord {
    pub circumference_cm: u8,
    pub device_name: String<NAME_MAX_LEN>,
    pub operator_name: String<NAME_MAX_LEN>,
}

impl LoadedRecord {
    /// Convert into an uncommitted [`ConfigRecord`] (`has_data` stays
    /// false until the store write succeeds).
    pub fn into_record(self) -> ConfigRecord {
        ConfigRecord {
            has_data: false,
            wheel_circumference_cm: self.circumference_cm,
            device_name: self.device_name,
            operator_name: self.operator_name,
        }
    }
}

/// Strip one trailing `\r` - records authored on a PC are CRLF.
fn trim_line(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn bounded(line: &str) -> Result<String<NAME_MAX_LEN>, Error> {
    let mut out = String::new();
    out.push_str(line).map_err(|_| Error::FieldOverflow)?;
    Ok(out)
}

/// Parse the three-field record text.
pub fn parse_record(text: &str) -> Result<LoadedRecord, Error> {
    let mut fields = text.splitn(3, '\n');

    // splitn always yields at least one (possibly empty) item.
    let circumference = fields.next().unwrap_or("");
    let device_name = fields.next().ok_or(Error::MalformedRecord)?;
    let rest = fields.next().ok_or(Error::MalformedRecord)?;
    // The third field runs to the next newline; trailing content is
    // not ours to interpret.
    let operator_name = rest.split('\n').next().unwrap_or(rest);

    let circumference_cm = trim_line(circumference)
        .parse::<u8>()
        .map_err(|_| Error::MalformedRecord)?;

    Ok(LoadedRecord {
        circumference_cm,
        device_name: bounded(trim_line(device_name))?,
        operator_name: bounded(trim_line(operator_name))?,
    })
}

/// Pull and parse the record from a source.
pub fn load_record<S: RecordSource>(source: &mut S) -> Result<LoadedRecord, Error> {
    let mut buf = [0u8; crate::config::SOURCE_RECORD_MAX_LEN];
    let len = source.read_record(&mut buf)?;
    let text = core::str::from_utf8(&buf[..len]).map_err(|_| Error::MalformedRecord)?;
    parse_record(text)
}
