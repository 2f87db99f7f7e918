//! Retention sweep over every per-project state file.
//!
//! Conservative by construction: a file is only deleted when its
//! `updated_at` parses and is older than the cutoff. Unreadable, corrupt or
//! undated documents are left in place.

use std::fs;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::atomic::{read_json, remove_if_exists};
use crate::paths::{is_state_file, is_temp_file};

/// Age after which an orphaned `.tmp_*` file is assumed abandoned (1 hour).
pub const TEMP_FILE_MAX_AGE: std::time::Duration = std::time::Duration::from_secs(3600);

/// A state file whose `updated_at` falls before the retention cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleDocument {
    pub path: PathBuf,
    pub updated_at: OffsetDateTime,
}

/// Parse a stored timestamp: RFC 3339, or a naive ISO 8601 date-time
/// (no offset) taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    let naive = time::format_description::parse_owned::<1>(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]",
    )
    .ok()?;
    PrimitiveDateTime::parse(s, &naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn state_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "state dir not readable, nothing to sweep");
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| is_state_file(p))
        .collect();
    files.sort();
    files
}

/// Oldest `updated_at` that is still kept. `None` when nothing can be stale:
/// a negative window, or one reaching past the representable date range.
fn retention_cutoff(retention: time::Duration, now: OffsetDateTime) -> Option<OffsetDateTime> {
    if retention.is_negative() {
        tracing::warn!(%retention, "cleanup: negative retention window, skipping sweep");
        return None;
    }
    now.checked_sub(retention)
}

/// Read `path` and report it if its `updated_at` is before `cutoff`.
fn check_stale(path: &Path, cutoff: OffsetDateTime) -> Option<StaleDocument> {
    let Some(doc) = read_json(path) else {
        tracing::debug!(path = %path.display(), "skipping unreadable state file");
        return None;
    };
    let Some(updated) = doc.get("updated_at").and_then(|v| v.as_str()) else {
        tracing::warn!(path = %path.display(), "cleanup: state file has no updated_at");
        return None;
    };
    match parse_timestamp(updated) {
        Some(updated_at) if updated_at < cutoff => Some(StaleDocument {
            path: path.to_path_buf(),
            updated_at,
        }),
        Some(_) => None,
        None => {
            tracing::warn!(path = %path.display(), updated_at = updated, "cleanup: unparseable updated_at");
            None
        }
    }
}

/// List documents in `dir` not updated within `retention` of `now`.
pub fn plan_cleanup(
    dir: &Path,
    retention: time::Duration,
    now: OffsetDateTime,
) -> Vec<StaleDocument> {
    let Some(cutoff) = retention_cutoff(retention, now) else {
        return Vec::new();
    };
    state_files(dir)
        .iter()
        .filter_map(|path| check_stale(path, cutoff))
        .collect()
}

/// Delete documents in `dir` older than `retention`. Returns the number removed.
pub fn cleanup(dir: &Path, retention: time::Duration) -> usize {
    cleanup_at(dir, retention, OffsetDateTime::now_utc())
}

/// Each file is judged and removed in turn, right after it is read.
pub fn cleanup_at(dir: &Path, retention: time::Duration, now: OffsetDateTime) -> usize {
    let Some(cutoff) = retention_cutoff(retention, now) else {
        return 0;
    };
    let mut removed = 0;
    for path in state_files(dir) {
        if check_stale(&path, cutoff).is_none() {
            continue;
        }
        match remove_if_exists(&path) {
            Ok(true) => {
                removed += 1;
                tracing::debug!(path = %path.display(), "cleaned up old state");
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cleanup error");
            }
        }
    }
    removed
}

/// Remove `.tmp_*` files left behind by writers that died mid-write.
/// Only files whose mtime is older than `max_age` are touched, so in-flight
/// writes of concurrent processes are never disturbed.
pub fn sweep_stale_temps(dir: &Path, max_age: std::time::Duration) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    let now = std::time::SystemTime::now();
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !is_temp_file(&path) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age && fs::remove_file(&path).is_ok() {
            tracing::debug!(path = %path.display(), "removed orphaned temp file");
            removed += 1;
        }
    }
    removed
}
