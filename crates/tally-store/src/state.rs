//! Load, save and query the per-project [`StateDocument`].

use std::path::PathBuf;

use serde_json::Value;
use tally_core::{
    check_state_document, flag, partition_todos, StateDocument, TodoItem, UNKNOWN_SESSION,
};

use crate::atomic::{read_json, remove_if_exists, write_json};
use crate::config::StoreConfig;
use crate::paths::StorePaths;
use crate::project::ProjectKey;

/// Environment variable carrying the host's session id.
pub const SESSION_ID_ENV: &str = "CLAUDE_SESSION_ID";

/// Per-project entry point to the store. Cheap to clone; holds no open files.
#[derive(Debug, Clone)]
pub struct StateManager {
    paths: StorePaths,
    project: ProjectKey,
    session_id: String,
}

impl StateManager {
    pub fn new(config: &StoreConfig, project: ProjectKey, session_id: Option<&str>) -> Self {
        let session_id = session_id
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SESSION)
            .to_string();
        Self {
            paths: config.paths(),
            project,
            session_id,
        }
    }

    pub fn project(&self) -> &ProjectKey {
        &self.project
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state_path(&self) -> PathBuf {
        self.paths.state_file(&self.project.id)
    }

    fn fresh(&self) -> StateDocument {
        StateDocument::empty(
            &self.project.id,
            &self.project.name,
            &self.session_id,
            &now_rfc3339(),
        )
    }

    /// Current document, or a fresh empty one (not persisted) when the file
    /// is missing, unreadable, of an unknown version or schema-invalid.
    pub fn load(&self) -> StateDocument {
        match read_json(&self.state_path()).and_then(decode_document) {
            Some(doc) => doc,
            None => {
                tracing::debug!(project = %self.project.id, "creating new state (none found or invalid)");
                self.fresh()
            }
        }
    }

    /// Stamp `updated_at` and `session_id`, then write atomically.
    pub fn save(&self, doc: &mut StateDocument) -> bool {
        doc.updated_at = now_rfc3339();
        doc.session_id = self.session_id.clone();
        write_json(&self.state_path(), doc)
    }

    /// Replace the whole list with the valid subset of `items`.
    pub fn update_todos(&self, items: &[Value]) -> bool {
        let mut doc = self.load();
        let (valid, rejected) = partition_todos(items);
        for (index, reason) in &rejected {
            tracing::debug!(index, %reason, "dropping invalid todo");
        }
        if !rejected.is_empty() {
            tracing::debug!("filtered {} invalid todos", rejected.len());
        }
        doc.todos = valid;
        self.save(&mut doc)
    }

    pub fn get_incomplete(&self) -> Vec<TodoItem> {
        self.load().incomplete()
    }

    pub fn get_in_progress(&self) -> Vec<TodoItem> {
        self.load().in_progress()
    }

    /// Flag the document as saved right before a context compaction.
    /// Only writes when there is unfinished work; returns whether it did.
    pub fn mark_compaction(&self, trigger: &str) -> bool {
        let mut doc = self.load();
        let incomplete = doc.incomplete().len();
        if incomplete == 0 {
            return false;
        }
        tracing::debug!(incomplete, trigger, "saving incomplete todos before compact");
        doc.set_flag(flag::LAST_COMPACT, true);
        doc.set_flag(flag::COMPACT_TRIGGER, trigger);
        self.save(&mut doc)
    }

    /// Delete this project's document. A missing document counts as cleared.
    pub fn clear(&self) -> bool {
        let path = self.state_path();
        match remove_if_exists(&path) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to clear state");
                false
            }
        }
    }
}

/// Decode a raw document by its `schema_version`. Unknown or missing
/// versions are treated as absent.
pub fn decode_document(raw: Value) -> Option<StateDocument> {
    match raw.get("schema_version").and_then(Value::as_u64) {
        Some(1) => decode_v1(raw),
        Some(version) => {
            tracing::debug!(version, "unsupported schema version, treating as absent");
            None
        }
        None => None,
    }
}

fn decode_v1(raw: Value) -> Option<StateDocument> {
    if let Err(e) = check_state_document(&raw) {
        tracing::debug!(error = %e, "state document failed validation");
        return None;
    }
    serde_json::from_value(raw)
        .map_err(|e| tracing::debug!(error = %e, "state document failed to decode"))
        .ok()
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
