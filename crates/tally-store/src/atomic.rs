//! Crash-safe file replacement and locked reads.
//!
//! A write is staged into a temp file next to the target (same directory, so
//! the final rename is atomic), synced to disk under an exclusive lock, and
//! only then renamed over the target. The target path therefore always holds
//! either the previous complete document or the new one.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Result, StoreError};
use crate::paths::TEMP_FILE_PREFIX;

/// A fully written and synced temp file that has not yet replaced its target.
///
/// Dropping it without [`commit`](Self::commit) deletes the temp file and
/// leaves the target untouched.
#[derive(Debug)]
pub struct StagedWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl StagedWrite {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn temp_path(&self) -> &Path {
        self.tmp.path()
    }

    /// Atomically rename the temp file over the target.
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        // On failure the returned PersistError owns the temp file and removes it on drop.
        self.tmp.persist(&target).map_err(|e| StoreError::Persist {
            path: target.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

/// Write `data` into a temp file beside `path`, flushed and synced under an
/// exclusive lock.
pub fn stage(path: &Path, data: &[u8]) -> Result<StagedWrite> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| StoreError::NoParent(path.to_path_buf()))?;
    fs::create_dir_all(parent)?;
    let tmp = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(".json")
        .tempfile_in(parent)?;

    let file = tmp.as_file();
    FileExt::lock_exclusive(file)?;
    let written = write_synced(file, data);
    let unlocked = FileExt::unlock(file);
    written?;
    unlocked?;

    Ok(StagedWrite {
        target: path.to_path_buf(),
        tmp,
    })
}

fn write_synced(mut file: &File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()
}

/// Atomic write: stage to a temp file in the same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    stage(path, data)?.commit()
}

/// Serialize `value` as pretty JSON and write it atomically.
/// Failures are logged and reported as `false`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> bool {
    let result = serde_json::to_vec_pretty(value)
        .map_err(StoreError::from)
        .and_then(|bytes| write_atomic(path, &bytes));
    match result {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "atomic write successful");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "atomic write failed");
            false
        }
    }
}

/// Read and parse a JSON file under a shared lock.
/// Missing files, unreadable files and malformed JSON all yield `None`.
pub fn read_json(path: &Path) -> Option<serde_json::Value> {
    if !path.exists() {
        return None;
    }
    match read_locked(path) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "safe read failed");
            None
        }
    }
}

fn read_locked(path: &Path) -> Result<serde_json::Value> {
    let mut file = File::open(path)?;
    FileExt::lock_shared(&file)?;
    let mut buf = String::new();
    let read = file.read_to_string(&mut buf);
    let _ = FileExt::unlock(&file);
    read?;
    Ok(serde_json::from_str(&buf)?)
}

/// Remove `path`, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
