//! Store configuration, resolved from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TALLY_STATE_DIR` | `~/.claude/todo-state` | Directory holding state files and the debug log |
//! | `TALLY_RETENTION_DAYS` | 7 | Age after which an untouched state file is swept |
//! | `TALLY_LOG_MAX_BYTES` | 5 MiB | Size at which `debug.log` is rotated |

use std::path::PathBuf;
use std::str::FromStr;

use crate::paths::StorePaths;

pub const DEFAULT_RETENTION_DAYS: u32 = 7;
pub const DEFAULT_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Injected handle for everything that touches the state directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub state_dir: PathBuf,
    pub retention: time::Duration,
    pub log_max_bytes: u64,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let state_dir = std::env::var_os("TALLY_STATE_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_state_dir);
        let retention_days =
            env_parse::<u32>("TALLY_RETENTION_DAYS").unwrap_or(DEFAULT_RETENTION_DAYS);
        Self {
            state_dir,
            retention: retention_days_to_duration(retention_days),
            log_max_bytes: env_parse("TALLY_LOG_MAX_BYTES").unwrap_or(DEFAULT_LOG_MAX_BYTES),
        }
    }

    /// Defaults rooted at an explicit directory.
    pub fn with_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            retention: retention_days_to_duration(DEFAULT_RETENTION_DAYS),
            log_max_bytes: DEFAULT_LOG_MAX_BYTES,
        }
    }

    pub fn paths(&self) -> StorePaths {
        StorePaths::discover(&self.state_dir)
    }
}

/// Return the default state root: `~/.claude/todo-state/`
pub fn default_state_dir() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        home.join(".claude").join("todo-state")
    } else {
        PathBuf::from(".tally-state")
    }
}

/// Retention window for a non-negative day count. `u32` days always fit in
/// a `time::Duration`, so this cannot overflow.
pub fn retention_days_to_duration(days: u32) -> time::Duration {
    time::Duration::days(i64::from(days))
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
