//! File layout of the state directory.

use std::path::{Path, PathBuf};

/// Prefix of every per-project state file.
pub const STATE_FILE_PREFIX: &str = "todos_";
/// Extension of every per-project state file.
pub const STATE_FILE_EXT: &str = "json";
/// Prefix of in-flight temp files created next to their target.
pub const TEMP_FILE_PREFIX: &str = ".tmp_";

/// All well-known paths under the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub state_dir: PathBuf,
    pub debug_log: PathBuf,
    pub debug_log_backup: PathBuf,
}

impl StorePaths {
    /// Derive all paths from a state directory. Pure computation, no I/O.
    pub fn discover(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            debug_log: state_dir.join("debug.log"),
            debug_log_backup: state_dir.join("debug.log.old"),
            state_dir,
        }
    }

    /// Create the state directory. Idempotent.
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.state_dir)
    }

    /// `<state_dir>/todos_<project_id>.json`
    pub fn state_file(&self, project_id: &str) -> PathBuf {
        self.state_dir
            .join(format!("{STATE_FILE_PREFIX}{project_id}.{STATE_FILE_EXT}"))
    }
}

/// Whether `path` names a per-project state file (not a temp artifact).
pub fn is_state_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(STATE_FILE_PREFIX)
        && path.extension().and_then(|e| e.to_str()) == Some(STATE_FILE_EXT)
}

pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(TEMP_FILE_PREFIX))
}
