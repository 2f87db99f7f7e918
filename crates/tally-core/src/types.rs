//! Todo items and the persisted state document.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Current schema version for new state documents.
pub const SCHEMA_VERSION: u32 = 1;

/// Session id recorded when the caller did not supply one.
pub const UNKNOWN_SESSION: &str = "unknown";

/// Advisory flag keys attached to a document outside the validated schema.
pub mod flag {
    /// Set when the document was saved right before a context compaction.
    pub const LAST_COMPACT: &str = "last_compact";
    /// What triggered that compaction (`manual`, `auto`, ...).
    pub const COMPACT_TRIGGER: &str = "compact_trigger";
}

/// Lifecycle state of a single todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    /// Wire names accepted by the validator, in display order.
    pub const NAMES: [&'static str; 3] = ["pending", "in_progress", "completed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Pending and in-progress todos still need work.
    pub fn is_incomplete(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the assistant's task list, as reported by `TodoWrite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Imperative description ("Run the tests").
    pub content: String,
    /// Present-continuous description shown while active ("Running the tests").
    #[serde(rename = "activeForm")]
    pub active_form: String,
    pub status: TodoStatus,
}

impl TodoItem {
    pub fn new(content: impl Into<String>, active_form: impl Into<String>, status: TodoStatus) -> Self {
        Self {
            content: content.into(),
            active_form: active_form.into(),
            status,
        }
    }
}

/// The persisted todo list of one project (`todos_<project_id>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub schema_version: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_name: String,
    #[serde(default)]
    pub todos: Vec<TodoItem>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
    #[serde(default = "unknown_session", deserialize_with = "lenient_session")]
    pub session_id: String,
    /// Advisory flags; not validated, carried through load/save untouched.
    #[serde(flatten)]
    pub flags: BTreeMap<String, Value>,
}

fn unknown_session() -> String {
    UNKNOWN_SESSION.to_string()
}

/// Metadata strings are not part of the validated schema: scalars are
/// stringified, `null` and containers read as empty.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

fn lenient_session<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let s = lenient_string(d)?;
    Ok(if s.is_empty() { unknown_session() } else { s })
}

impl StateDocument {
    /// A fresh, empty document stamped with `now` as both timestamps.
    pub fn empty(project_id: &str, project_name: &str, session_id: &str, now: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            project_id: project_id.to_string(),
            project_name: project_name.to_string(),
            todos: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
            session_id: session_id.to_string(),
            flags: BTreeMap::new(),
        }
    }

    /// Pending and in-progress todos, in list order.
    pub fn incomplete(&self) -> Vec<TodoItem> {
        self.todos
            .iter()
            .filter(|t| t.status.is_incomplete())
            .cloned()
            .collect()
    }

    /// In-progress todos, in list order.
    pub fn in_progress(&self) -> Vec<TodoItem> {
        self.todos
            .iter()
            .filter(|t| t.status == TodoStatus::InProgress)
            .cloned()
            .collect()
    }

    pub fn set_flag(&mut self, key: &str, value: impl Into<Value>) {
        self.flags.insert(key.to_string(), value.into());
    }

    pub fn flag(&self, key: &str) -> Option<&Value> {
        self.flags.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StateDocument {
        let mut doc = StateDocument::empty("abc", "demo", "s1", "2026-01-01T00:00:00Z");
        doc.todos = vec![
            TodoItem::new("A", "Doing A", TodoStatus::Pending),
            TodoItem::new("B", "Doing B", TodoStatus::InProgress),
            TodoItem::new("C", "Doing C", TodoStatus::Completed),
            TodoItem::new("D", "Doing D", TodoStatus::Pending),
        ];
        doc
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TodoStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        for name in TodoStatus::NAMES {
            assert_eq!(TodoStatus::parse(name).unwrap().as_str(), name);
        }
        assert!(TodoStatus::parse("done").is_none());
    }

    #[test]
    fn todo_item_uses_camel_case_active_form() {
        let item = TodoItem::new("Run tests", "Running tests", TodoStatus::Pending);
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["activeForm"], "Running tests");
        assert!(v.get("active_form").is_none());
    }

    #[test]
    fn views_preserve_order() {
        let doc = sample();
        let incomplete: Vec<_> = doc.incomplete().into_iter().map(|t| t.content).collect();
        assert_eq!(incomplete, vec!["A", "B", "D"]);
        let active: Vec<_> = doc.in_progress().into_iter().map(|t| t.content).collect();
        assert_eq!(active, vec!["B"]);
    }

    #[test]
    fn flags_are_flattened_and_survive_round_trip() {
        let mut doc = sample();
        doc.set_flag(flag::LAST_COMPACT, true);
        doc.set_flag(flag::COMPACT_TRIGGER, "auto");
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["last_compact"], true);
        assert_eq!(v["compact_trigger"], "auto");

        let back: StateDocument = serde_json::from_value(v).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.flag(flag::LAST_COMPACT), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn odd_metadata_types_still_decode() {
        let v = serde_json::json!({
            "schema_version": 1,
            "project_id": 42,
            "project_name": ["x"],
            "created_at": true,
            "updated_at": null,
            "session_id": null,
            "todos": [{"content": "A", "status": "in_progress", "activeForm": "a"}]
        });
        let doc: StateDocument = serde_json::from_value(v).unwrap();
        assert_eq!(doc.project_id, "42");
        assert_eq!(doc.project_name, "");
        assert_eq!(doc.created_at, "true");
        assert_eq!(doc.updated_at, "");
        assert_eq!(doc.session_id, UNKNOWN_SESSION);
        assert_eq!(doc.in_progress().len(), 1);
        assert!(doc.flags.is_empty());
    }

    #[test]
    fn missing_session_defaults_to_unknown() {
        let v = serde_json::json!({ "schema_version": 1, "todos": [] });
        let doc: StateDocument = serde_json::from_value(v).unwrap();
        assert_eq!(doc.session_id, UNKNOWN_SESSION);
        assert!(doc.flags.is_empty());
    }
}
