//! Private copies of a database owned by another process.
//!
//! Zotero keeps `zotero.sqlite` open (often with an exclusive lock) while it
//! runs. Queries go against a temporary copy so they never contend with the
//! application or observe a half-written page.
use rusqlite::backup::{Backup, StepResult};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;
use tempfile::TempPath;
use tracing::{debug, warn};

use zotseek_core::error::{Error, Result};

const PAGES_PER_STEP: std::os::raw::c_int = 256;
const STEP_PAUSE: Duration = Duration::from_millis(10);
/// Busy/locked steps tolerated before giving up on the online backup.
const MAX_BUSY_STEPS: u32 = 50;

/// A temporary snapshot file, removed when dropped.
#[derive(Debug)]
pub struct Snapshot {
    path: TempPath,
}

impl Snapshot {
    /// Copy `source` into a fresh, uniquely named file in the OS temp dir.
    ///
    /// Tries SQLite's online backup first and falls back to a byte copy of the
    /// file. Fails only when both strategies fail; the partially written
    /// temporary file is removed in that case.
    pub fn create(source: &Path) -> Result<Self> {
        let path = tempfile::Builder::new()
            .prefix("zotero_")
            .suffix(".sqlite")
            .tempfile()
            .map_err(|source_err| Error::Snapshot { path: source.to_path_buf(), source: source_err })?
            .into_temp_path();

        match online_backup(source, &path) {
            Ok(()) => debug!(source = %source.display(), snapshot = %path.display(), "online backup complete"),
            Err(err) => {
                warn!(source = %source.display(), error = %err, "online backup failed; copying file");
                std::fs::copy(source, &path).map_err(|io_err| Error::Snapshot { path: source.to_path_buf(), source: io_err })?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the copy. The copy is private, so a normal read-write handle is fine and
    /// lets SQLite tidy up any WAL files it creates when the handle closes.
    pub fn open(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }
}

fn online_backup(source: &Path, dest: &Path) -> rusqlite::Result<()> {
    let src = Connection::open_with_flags(source, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)?;
    // no busy handler: the step loop below is the only wait on a locked source
    src.busy_timeout(Duration::ZERO)?;
    let mut dst = Connection::open(dest)?;
    let backup = Backup::new(&src, &mut dst)?;
    let mut busy_steps = 0;
    loop {
        match backup.step(PAGES_PER_STEP)? {
            StepResult::Done => return Ok(()),
            StepResult::More => {}
            StepResult::Busy | StepResult::Locked => {
                busy_steps += 1;
                if busy_steps > MAX_BUSY_STEPS {
                    return Err(rusqlite::Error::SqliteFailure(
                        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
                        Some("source database stayed locked during backup".to_string()),
                    ));
                }
                std::thread::sleep(STEP_PAUSE);
            }
            // StepResult is non-exhaustive
            _ => std::thread::sleep(STEP_PAUSE),
        }
    }
}
