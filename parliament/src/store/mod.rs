//! Durable record storage
//!
//! Three records make up a parliament: `session.json`, `ledger.json` and
//! `bill.json`. Records are always loaded and written whole.
//!
//! # Commit protocol
//!
//! A transition stages every record it changed into one [`Commit`]. All
//! records are encoded before anything touches the disk, so a serialization
//! failure writes nothing. The file store then writes each record to a
//! temporary sibling, syncs it, and renames the temporaries into place in
//! staging order. Transitions stage the session last: the session file acts
//! as the commit marker, and an interruption can only leave the ledger ahead
//! of the session counter, which [`crate::reconcile`] detects and repairs.
//!
//! Only one transition may run against a parliament at a time; stores hand
//! out a guard from [`RecordStore::lock`] that transitions hold for their
//! whole load-compute-commit cycle.

pub mod file;
pub mod lock;
pub mod memory;

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};

use crate::bill::Bill;
use crate::deliberation::{Ledger, Session};
use crate::error::{ParliamentError, ParliamentResult};

pub use file::{FileStore, LOCK_FILE_NAME};
pub use lock::WriteLock;
pub use memory::MemoryStore;

/// Which durable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Session,
    Ledger,
    Bill,
}

impl RecordKind {
    /// Default file name inside a working directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Session => "session.json",
            Self::Ledger => "ledger.json",
            Self::Bill => "bill.json",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Ledger => write!(f, "ledger"),
            Self::Bill => write!(f, "bill"),
        }
    }
}

/// A serializable durable record.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: RecordKind;
}

impl Record for Session {
    const KIND: RecordKind = RecordKind::Session;
}

impl Record for Ledger {
    const KIND: RecordKind = RecordKind::Ledger;
}

impl Record for Bill {
    const KIND: RecordKind = RecordKind::Bill;
}

/// Canonical on-disk encoding: pretty JSON with a trailing newline.
pub fn encode<R: Record>(record: &R) -> ParliamentResult<String> {
    let mut json = serde_json::to_string_pretty(record)?;
    json.push('\n');
    Ok(json)
}

/// Decode a record, reporting parse failures as corruption at `location`.
pub fn decode<R: Record>(raw: &str, location: impl Into<PathBuf>) -> ParliamentResult<R> {
    if raw.trim().is_empty() {
        return Err(ParliamentError::corrupt(R::KIND, location, "file is empty"));
    }
    serde_json::from_str(raw).map_err(|e| ParliamentError::corrupt(R::KIND, location, e.to_string()))
}

/// An ordered batch of encoded records applied as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    writes: Vec<(RecordKind, String)>,
}

impl Commit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and stage a record. Staging the same kind twice keeps the
    /// later version in the earlier slot.
    pub fn stage<R: Record>(mut self, record: &R) -> ParliamentResult<Self> {
        let encoded = encode(record)?;
        match self.writes.iter_mut().find(|(kind, _)| *kind == R::KIND) {
            Some(slot) => slot.1 = encoded,
            None => self.writes.push((R::KIND, encoded)),
        }
        Ok(self)
    }

    /// Staged kinds in write order.
    pub fn kinds(&self) -> Vec<RecordKind> {
        self.writes.iter().map(|(kind, _)| *kind).collect()
    }

    pub(crate) fn into_writes(self) -> Vec<(RecordKind, String)> {
        self.writes
    }
}

/// Load/commit contract every backing store fulfils.
pub trait RecordStore {
    /// Guard held for the duration of one transition.
    type Guard;

    /// Acquire exclusive access for one transition.
    fn lock(&self) -> ParliamentResult<Self::Guard>;

    /// Human-readable location of a record, used in errors and summaries.
    fn location(&self, kind: RecordKind) -> PathBuf;

    /// Raw record text, or `None` when the record does not exist.
    fn read_raw(&self, kind: RecordKind) -> ParliamentResult<Option<String>>;

    /// Apply a staged batch.
    fn commit(&mut self, commit: Commit) -> ParliamentResult<()>;

    fn exists(&self, kind: RecordKind) -> ParliamentResult<bool> {
        Ok(self.read_raw(kind)?.is_some())
    }

    /// Load and decode a record; missing and corrupt records are errors.
    fn load<R: Record>(&self) -> ParliamentResult<R>
    where
        Self: Sized,
    {
        let location = self.location(R::KIND);
        match self.read_raw(R::KIND)? {
            Some(raw) => decode(&raw, location),
            None => Err(ParliamentError::missing(R::KIND, location)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_trailing_newline() {
        let encoded = encode(&Bill::empty()).unwrap();
        assert!(encoded.ends_with("}\n"));
        assert!(encoded.contains("  \"bill_id\": null"));
    }

    #[test]
    fn test_decode_empty_is_corrupt() {
        let err = decode::<Bill>("  \n", "bill.json").unwrap_err();
        assert!(matches!(
            err,
            ParliamentError::CorruptRecord {
                kind: RecordKind::Bill,
                ..
            }
        ));
    }

    #[test]
    fn test_commit_order_and_restage() {
        let bill = Bill::empty();
        let mut later = Bill::empty();
        later.version = 3;

        let commit = Commit::new().stage(&bill).unwrap().stage(&later).unwrap();
        assert_eq!(commit.kinds(), vec![RecordKind::Bill]);
        let writes = commit.into_writes();
        assert!(writes[0].1.contains("\"version\": 3"));
    }

    #[test]
    fn test_record_kind_names() {
        assert_eq!(RecordKind::Session.file_name(), "session.json");
        assert_eq!(RecordKind::Ledger.to_string(), "ledger");
    }
}
