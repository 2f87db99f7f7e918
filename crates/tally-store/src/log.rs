//! Append-only debug log with single-generation rotation.
//!
//! Nothing here may fail the caller: every I/O error is swallowed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::StoreConfig;
use crate::paths::StorePaths;

/// Shared `debug.log` in the state directory, rotated to `debug.log.old`.
#[derive(Debug, Clone)]
pub struct DebugLog {
    path: PathBuf,
    backup: PathBuf,
    max_bytes: u64,
}

impl DebugLog {
    pub fn new(paths: &StorePaths, max_bytes: u64) -> Self {
        Self {
            path: paths.debug_log.clone(),
            backup: paths.debug_log_backup.clone(),
            max_bytes,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.paths(), config.log_max_bytes)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Move the log aside once it exceeds the size threshold, replacing any
    /// previous backup.
    fn rotate_if_needed(&self) {
        let Ok(meta) = fs::metadata(&self.path) else {
            return;
        };
        if meta.len() <= self.max_bytes {
            return;
        }
        let _ = fs::remove_file(&self.backup);
        let _ = fs::rename(&self.path, &self.backup);
    }

    fn open(&self) -> Option<File> {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .ok()
    }

    /// Writer for one log record. Rotation is checked each time a writer is
    /// made, so this doubles as a `tracing_subscriber` `MakeWriter` via
    /// `move || log.writer()`.
    pub fn writer(&self) -> DebugLogWriter {
        self.rotate_if_needed();
        DebugLogWriter { file: self.open() }
    }

    /// Append one timestamped line.
    pub fn append(&self, msg: &str) {
        let ts = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        let mut w = self.writer();
        let _ = writeln!(w, "[{ts}] {msg}");
    }
}

/// Best-effort handle to the debug log; writes that fail are dropped.
#[derive(Debug)]
pub struct DebugLogWriter {
    file: Option<File>,
}

impl Write for DebugLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(f) = self.file.as_mut() {
            let _ = f.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(f) = self.file.as_mut() {
            let _ = f.flush();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_writes_timestamped_line() {
        let tmp = tempfile::tempdir().unwrap();
        let log = DebugLog::new(&StorePaths::discover(tmp.path()), 1024);
        log.append("hello");
        log.append("world");
        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] hello"));
    }

    #[test]
    fn rotates_into_single_backup() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StorePaths::discover(tmp.path());
        let log = DebugLog::new(&paths, 16);

        fs::write(&paths.debug_log_backup, "ancient").unwrap();
        fs::write(&paths.debug_log, "x".repeat(64)).unwrap();
        log.append("fresh");

        let backup = fs::read_to_string(&paths.debug_log_backup).unwrap();
        assert_eq!(backup, "x".repeat(64));
        let current = fs::read_to_string(&paths.debug_log).unwrap();
        assert!(current.ends_with("] fresh\n"));
    }

    #[test]
    fn unwritable_location_is_swallowed() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let log = DebugLog::new(&StorePaths::discover(blocker.join("state")), 16);
        log.append("goes nowhere");
        let mut w = log.writer();
        assert_eq!(w.write(b"abc").unwrap(), 3);
        assert!(w.flush().is_ok());
    }
}
