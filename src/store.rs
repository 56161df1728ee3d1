//! Non-volatile configuration store.
//!
//! The rider configuration lives in a 512-byte region of the AT24C32
//! EEPROM that ships on the RTC module. The region is laid out as a
//! fixed field table:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Presence flag: u8 (0x01 = committed)         │  Offset: 0
//! ├──────────────────────────────────────────────┤
//! │ Wheel circumference: u8 (cm)                 │  Offset: 1
//! ├──────────────────────────────────────────────┤
//! │ Device name: 1 length byte + ≤32 bytes       │  Offset: 2
//! ├──────────────────────────────────────────────┤
//! │ Operator name: 1 length byte + ≤32 bytes     │  Offset: 100
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The layout table is validated once at store construction: slots must
//! not overlap and must fit the region. A string longer than its slot is
//! rejected before any byte reaches the medium, so a bad write can never
//! corrupt a neighbouring field.

use crate::config::{
    CIRCUMFERENCE_OFFSET, DEVICE_NAME_OFFSET, FLAG_OFFSET, NAME_MAX_LEN, OPERATOR_NAME_OFFSET,
    RECORD_PRESENT, STORE_REGION_SIZE,
};
use crate::error::Error;
use heapless::String;

/// The in-memory configuration record.
///
/// `has_data == false` means the store held no committed record; the
/// remaining fields are defaults and must not be trusted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRecord {
    /// True once a valid record has been committed to the store.
    pub has_data: bool,
    /// Wheel circumference in centimetres.
    pub wheel_circumference_cm: u8,
    /// Name painted on the head tube.
    pub device_name: String<NAME_MAX_LEN>,
    /// Who rides it.
    pub operator_name: String<NAME_MAX_LEN>,
}

/// One slot in the store layout: a named byte range.
#[derive(Clone, Copy, Debug)]
pub struct FieldSlot {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

/// The full layout. String slots reserve their declared maximum payload
/// plus one length byte.
pub const LAYOUT: [FieldSlot; 4] = [
    FieldSlot { name: "flag", offset: FLAG_OFFSET, width: 1 },
    FieldSlot { name: "circumference", offset: CIRCUMFERENCE_OFFSET, width: 1 },
    FieldSlot { name: "device_name", offset: DEVICE_NAME_OFFSET, width: 1 + NAME_MAX_LEN },
    FieldSlot { name: "operator_name", offset: OPERATOR_NAME_OFFSET, width: 1 + NAME_MAX_LEN },
];

/// Check a layout table for overlapping slots or slots outside the
/// reserved region.
pub fn check_layout(slots: &[FieldSlot]) -> Result<(), Error> {
    for (i, a) in slots.iter().enumerate() {
        if a.width == 0 || a.offset + a.width > STORE_REGION_SIZE {
            return Err(Error::BadLayout);
        }
        for b in slots.iter().skip(i + 1) {
            let disjoint = a.offset + a.width <= b.offset || b.offset + b.width <= a.offset;
            if !disjoint {
                return Err(Error::BadLayout);
            }
        }
    }
    Ok(())
}

/// Byte-addressed access to the non-volatile medium.
///
/// `write` may buffer; a record write is not durable until `commit`
/// returns. The RAM test double commits trivially, the EEPROM adapter
/// finishes its write cycle.
pub trait ConfigMedium {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Error>;
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Error>;
    fn commit(&mut self) -> Result<(), Error>;
}

/// The configuration store: field codec over a [`ConfigMedium`].
pub struct ConfigStore<M: ConfigMedium> {
    medium: M,
}

impl<M: ConfigMedium> ConfigStore<M> {
    /// Wrap a medium, validating the layout table once.
    pub fn new(medium: M) -> Result<Self, Error> {
        check_layout(&LAYOUT)?;
        Ok(Self { medium })
    }

    /// Read the committed record. An unset presence flag is a valid,
    /// expected state and yields defaults, not an error.
    pub fn read_record(&mut self) -> Result<ConfigRecord, Error> {
        let mut flag = [0u8; 1];
        self.medium.read(FLAG_OFFSET, &mut flag)?;
        if flag[0] != RECORD_PRESENT {
            return Ok(ConfigRecord::default());
        }

        let mut circumference = [0u8; 1];
        self.medium.read(CIRCUMFERENCE_OFFSET, &mut circumference)?;
        let device_name = self.read_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN)?;
        let operator_name = self.read_string(OPERATOR_NAME_OFFSET, NAME_MAX_LEN)?;

        Ok(ConfigRecord {
            has_data: true,
            wheel_circumference_cm: circumference[0],
            device_name,
            operator_name,
        })
    }

    /// Commit a record: presence flag, scalar, then both strings.
    /// String lengths are validated before the first byte is written,
    /// and the medium is committed before returning, so a subsequent
    /// `read_record` never observes a partial record.
    pub fn write_record(&mut self, record: &ConfigRecord) -> Result<(), Error> {
        if record.device_name.len() > NAME_MAX_LEN || record.operator_name.len() > NAME_MAX_LEN {
            return Err(Error::FieldOverflow);
        }

        self.medium.write(FLAG_OFFSET, &[RECORD_PRESENT])?;
        self.medium
            .write(CIRCUMFERENCE_OFFSET, &[record.wheel_circumference_cm])?;
        self.write_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN, record.device_name.as_str())?;
        self.write_string(
            OPERATOR_NAME_OFFSET,
            NAME_MAX_LEN,
            record.operator_name.as_str(),
        )?;
        self.medium.commit()
    }

    /// Zero the entire reserved region. The presence flag is unset
    /// afterwards.
    pub fn wipe(&mut self) -> Result<(), Error> {
        let zeros = [0u8; STORE_REGION_SIZE];
        self.medium.write(0, &zeros)?;
        self.medium.commit()
    }

    /// Write a length-prefixed string into the slot at `offset`.
    /// Fails with [`Error::FieldOverflow`] before touching the medium
    /// if the payload exceeds `max_len`.
    pub fn write_string(&mut self, offset: usize, max_len: usize, s: &str) -> Result<(), Error> {
        if s.len() > max_len {
            return Err(Error::FieldOverflow);
        }
        self.medium.write(offset, &[s.len() as u8])?;
        if !s.is_empty() {
            self.medium.write(offset + 1, s.as_bytes())?;
        }
        Ok(())
    }

    /// Read a length-prefixed string from the slot at `offset`. A
    /// length byte larger than the slot means the region is corrupt.
    pub fn read_string(&mut self, offset: usize, max_len: usize) -> Result<String<NAME_MAX_LEN>, Error> {
        let mut len = [0u8; 1];
        self.medium.read(offset, &mut len)?;
        let len = len[0] as usize;
        if len > max_len || len > NAME_MAX_LEN {
            return Err(Error::FieldOverflow);
        }

        let mut payload = [0u8; NAME_MAX_LEN];
        self.medium.read(offset + 1, &mut payload[..len])?;
        let text = core::str::from_utf8(&payload[..len]).map_err(|_| Error::MalformedRecord)?;

        let mut out = String::new();
        out.push_str(text).map_err(|_| Error::FieldOverflow)?;
        Ok(out)
    }

    /// Access the underlying medium (tests inspect raw bytes).
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    /// Give the medium back (simulated power cycles in tests).
    pub fn into_medium(self) -> M {
        self.medium
    }
}
