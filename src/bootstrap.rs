//! First-run bootstrap.
//!
//! Runs once at power-on, before the control loop:
//!
//! 1. Query the store's presence flag.
//! 2. Present → done, configuration is whatever the store returned.
//! 3. Absent → pull `info.txt` from the card and hand the parsed
//!    record back for operator confirmation (render-and-wait, pure
//!    pass-through - no content validation).
//! 4. On the confirm press, mark `has_data` and commit.
//!
//! Any failure in this sequence is terminal for the boot attempt: a
//! missing or garbled card record, or a store that refuses the commit,
//! leaves the device in a fatal state until the operator intervenes.
//! There is no retry - no safe default exists for wheel circumference
//! or identity.

use crate::error::Error;
use crate::loader::{self, RecordSource};
use crate::store::{ConfigMedium, ConfigRecord, ConfigStore};

/// Result of the first bootstrap phase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootOutcome {
    /// The store already held a committed record; normal operation can
    /// begin immediately. The loader was never consulted.
    Ready(ConfigRecord),
    /// A record was loaded from removable storage and awaits operator
    /// confirmation. `has_data` is still false.
    NeedsConfirm(ConfigRecord),
}

/// Phase one: establish a candidate configuration.
pub fn start<M, S>(store: &mut ConfigStore<M>, source: &mut S) -> Result<BootOutcome, Error>
where
    M: ConfigMedium,
    S: RecordSource,
{
    let record = store.read_record()?;
    if record.has_data {
        return Ok(BootOutcome::Ready(record));
    }

    let loaded = loader::load_record(source)?;
    Ok(BootOutcome::NeedsConfirm(loaded.into_record()))
}

/// Phase two: the operator confirmed the presented record. Mark it
/// committed and persist it. On a write failure the record is left
/// unmarked - nothing may claim `has_data` without a durable commit.
pub fn confirm<M: ConfigMedium>(
    store: &mut ConfigStore<M>,
    record: &mut ConfigRecord,
) -> Result<(), Error> {
    record.has_data = true;
    match store.write_record(record) {
        Ok(()) => Ok(()),
        Err(e) => {
            record.has_data = false;
            Err(e)
        }
    }
}
