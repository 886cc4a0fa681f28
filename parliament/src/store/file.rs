//! Directory-backed record store.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::lock::WriteLock;
use super::{Commit, RecordKind, RecordStore};
use crate::error::ParliamentResult;

/// Lock file name inside the working directory.
pub const LOCK_FILE_NAME: &str = ".parliament.lock";

/// Stores records as JSON files in one working directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    session_path: PathBuf,
}

impl FileStore {
    /// Records under their default names in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let session_path = dir.join(RecordKind::Session.file_name());
        Self { dir, session_path }
    }

    /// Session at an explicit path; ledger and bill are its siblings.
    pub fn for_session_file(path: impl Into<PathBuf>) -> Self {
        let session_path = path.into();
        let dir = match session_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self { dir, session_path }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: RecordKind) -> PathBuf {
        match kind {
            RecordKind::Session => self.session_path.clone(),
            other => self.dir.join(other.file_name()),
        }
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE_NAME)
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("record"));
        name.push(".tmp");
        path.with_file_name(name)
    }

    fn write_temp(path: &Path, contents: &str) -> ParliamentResult<PathBuf> {
        let temp = Self::temp_path(path);
        let mut file = File::create(&temp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        Ok(temp)
    }
}

impl RecordStore for FileStore {
    type Guard = WriteLock;

    fn lock(&self) -> ParliamentResult<WriteLock> {
        fs::create_dir_all(&self.dir)?;
        WriteLock::acquire(self.lock_path())
    }

    fn location(&self, kind: RecordKind) -> PathBuf {
        self.path(kind)
    }

    fn read_raw(&self, kind: RecordKind) -> ParliamentResult<Option<String>> {
        match fs::read_to_string(self.path(kind)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commit(&mut self, commit: Commit) -> ParliamentResult<()> {
        fs::create_dir_all(&self.dir)?;

        // Phase 1: every record lands in a synced temporary. Nothing visible
        // changes until all of them are written.
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (kind, contents) in commit.into_writes() {
            let target = self.path(kind);
            match Self::write_temp(&target, &contents) {
                Ok(temp) => staged.push((temp, target)),
                Err(e) => {
                    for (temp, _) in &staged {
                        let _ = fs::remove_file(temp);
                    }
                    let _ = fs::remove_file(Self::temp_path(&target));
                    return Err(e);
                }
            }
        }

        // Phase 2: rename in staging order.
        for (temp, target) in staged {
            fs::rename(&temp, &target)?;
            debug!(path = %target.display(), "Record committed");
        }

        sync_dir(&self.dir);
        Ok(())
    }
}

/// Persist the renames themselves. Best effort: failure is logged only.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        warn!(dir = %dir.display(), error = %e, "Directory sync failed");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
