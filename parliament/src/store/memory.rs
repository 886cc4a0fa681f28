//! In-memory record store.

use std::collections::HashMap;
use std::path::PathBuf;

use super::{Commit, RecordKind, RecordStore};
use crate::error::ParliamentResult;

/// Holds encoded records in memory. Used by tests and dry runs.
///
/// `interrupt_after` simulates a process dying partway through a commit:
/// only the first `n` staged writes of the next commit are applied before it
/// fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<RecordKind, String>,
    interrupt_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next commit after `writes` records have been applied.
    pub fn interrupt_after(&mut self, writes: usize) {
        self.interrupt_after = Some(writes);
    }

    /// Raw encoded record, if present.
    pub fn raw(&self, kind: RecordKind) -> Option<&str> {
        self.records.get(&kind).map(String::as_str)
    }

    /// Replace a record's raw text directly.
    pub fn put_raw(&mut self, kind: RecordKind, raw: impl Into<String>) {
        self.records.insert(kind, raw.into());
    }
}

impl RecordStore for MemoryStore {
    type Guard = ();

    fn lock(&self) -> ParliamentResult<()> {
        Ok(())
    }

    fn location(&self, kind: RecordKind) -> PathBuf {
        PathBuf::from("memory").join(kind.file_name())
    }

    fn read_raw(&self, kind: RecordKind) -> ParliamentResult<Option<String>> {
        Ok(self.records.get(&kind).cloned())
    }

    fn commit(&mut self, commit: Commit) -> ParliamentResult<()> {
        let limit = self.interrupt_after.take();
        for (applied, (kind, contents)) in commit.into_writes().into_iter().enumerate() {
            if limit == Some(applied) {
                return Err(std::io::Error::other(format!(
                    "commit interrupted before writing {}",
                    kind
                ))
                .into());
            }
            self.records.insert(kind, contents);
        }
        Ok(())
    }
}
