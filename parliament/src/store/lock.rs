//! Lock file guarding a working directory against concurrent transitions.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{ParliamentError, ParliamentResult};

/// Exclusive lock held for the lifetime of one transition.
///
/// The lock is an OS advisory lock on `.parliament.lock`, taken without
/// waiting, so a second process fails immediately. The file itself stays in
/// place; while held it names the holder's pid and acquisition time. The OS
/// drops the lock when the holding process exits, so a crash never leaves
/// the directory locked. Run `parliament reconcile` after a crash before the
/// next append.
#[derive(Debug)]
pub struct WriteLock {
    file: File,
    path: PathBuf,
}

impl WriteLock {
    pub fn acquire(path: impl Into<PathBuf>) -> ParliamentResult<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == ErrorKind::WouldBlock
                || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
            {
                let holder = fs::read_to_string(&path)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "unknown holder".to_string());
                return Err(ParliamentError::LockHeld { path, holder });
            }
            return Err(e.into());
        }

        // From here on Drop releases the lock, including on a failed write.
        let mut lock = Self { file, path };
        lock.record_holder()?;
        debug!(path = %lock.path.display(), "Write lock acquired");
        Ok(lock)
    }

    fn record_holder(&mut self) -> ParliamentResult<()> {
        self.file.set_len(0)?;
        writeln!(
            self.file,
            "pid={} acquired_at={}",
            std::process::id(),
            Utc::now().to_rfc3339()
        )?;
        self.file.sync_all()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.set_len(0) {
            warn!(path = %self.path.display(), error = %e, "Failed to clear lock holder");
        }
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release write lock");
        }
    }
}
