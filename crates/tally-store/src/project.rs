//! Project identity: the storage token and display name for a project root.

use std::path::{Path, PathBuf};

/// Environment variable carrying the host's project root.
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Length of a project token in hex characters (128 bits).
pub const PROJECT_ID_LEN: usize = 32;

/// A resolved project: its root string, storage token and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectKey {
    pub root: String,
    pub id: String,
    pub name: String,
}

impl ProjectKey {
    pub fn from_root(root: &str) -> Self {
        Self {
            root: root.to_string(),
            id: project_id(root),
            name: project_name(root),
        }
    }

    /// Pick the first non-empty of: explicit override, caller-provided cwd,
    /// the process working directory.
    pub fn resolve(override_root: Option<&str>, cwd: Option<&str>) -> Self {
        let root = [override_root, cwd]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .to_string_lossy()
                    .to_string()
            });
        Self::from_root(&root)
    }
}

/// Compute a deterministic project ID from a project root string.
/// project_id = blake3(normalize_root(input)) → hex string (first 32 chars).
/// Pure string work: the path is not canonicalized or touched on disk.
pub fn project_id(root: &str) -> String {
    let normalized = normalize_root(root);
    let hash = blake3::hash(normalized.as_bytes());
    hash.to_hex()[..PROJECT_ID_LEN].to_string()
}

/// Human-readable label: the last path component, or the whole root.
pub fn project_name(root: &str) -> String {
    let normalized = normalize_root(root);
    Path::new(&normalized)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or(normalized)
}

/// Normalize a root: forward slashes, no trailing separator, lowercase on Windows.
fn normalize_root(root: &str) -> String {
    let slashed = root.trim().replace('\\', "/");
    #[cfg(windows)]
    let slashed = slashed.to_lowercase();
    let trimmed = slashed.trim_end_matches('/');
    if trimmed.is_empty() && !slashed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
