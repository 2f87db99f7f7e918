//! Error type for fallible store internals.

use std::path::PathBuf;

use thiserror::Error;

/// Failures inside the store. Public state operations never surface these;
/// they are logged and folded into a `bool`/`Option` at the boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no parent directory for {}", .0.display())]
    NoParent(PathBuf),

    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
