//! Structural validation of raw todo items and state documents.
//!
//! Both checks operate on untyped JSON so that a single malformed item can be
//! dropped without rejecting the whole payload it arrived in.

use serde_json::Value;
use thiserror::Error;

use crate::types::{TodoItem, TodoStatus};

/// Why a todo item or state document failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("todo is not an object")]
    NotAnObject,
    #[error("todo missing required field: {0}")]
    MissingField(&'static str),
    #[error("todo field {0} is not a string")]
    NotAString(&'static str),
    #[error("todo content is empty")]
    EmptyContent,
    #[error("todo has invalid status: {0}")]
    InvalidStatus(String),
    #[error("state document is not an object")]
    DocumentNotAnObject,
    #[error("state document missing schema_version")]
    MissingSchemaVersion,
    #[error("state document todos is not an array")]
    TodosNotArray,
    #[error("todo #{index}: {reason}")]
    InvalidTodo { index: usize, reason: Box<SchemaError> },
}

fn required_str<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, SchemaError> {
    match obj.get(field) {
        None => Err(SchemaError::MissingField(field)),
        Some(v) => v.as_str().ok_or(SchemaError::NotAString(field)),
    }
}

/// Validate a raw todo and convert it into a [`TodoItem`].
pub fn parse_todo_item(item: &Value) -> Result<TodoItem, SchemaError> {
    let obj = item.as_object().ok_or(SchemaError::NotAnObject)?;
    let content = required_str(obj, "content")?;
    let status = required_str(obj, "status")?;
    let active_form = required_str(obj, "activeForm")?;
    if content.trim().is_empty() {
        return Err(SchemaError::EmptyContent);
    }
    let status =
        TodoStatus::parse(status).ok_or_else(|| SchemaError::InvalidStatus(status.to_string()))?;
    Ok(TodoItem::new(content, active_form, status))
}

pub fn check_todo_item(item: &Value) -> Result<(), SchemaError> {
    parse_todo_item(item).map(|_| ())
}

/// True iff `item` carries `content`, `activeForm` and a valid `status`.
pub fn validate_todo_item(item: &Value) -> bool {
    check_todo_item(item).is_ok()
}

pub fn check_state_document(doc: &Value) -> Result<(), SchemaError> {
    let obj = doc.as_object().ok_or(SchemaError::DocumentNotAnObject)?;
    if !obj.contains_key("schema_version") {
        return Err(SchemaError::MissingSchemaVersion);
    }
    let todos = match obj.get("todos") {
        None => return Ok(()),
        Some(v) => v.as_array().ok_or(SchemaError::TodosNotArray)?,
    };
    for (index, todo) in todos.iter().enumerate() {
        check_todo_item(todo).map_err(|reason| SchemaError::InvalidTodo {
            index,
            reason: Box::new(reason),
        })?;
    }
    Ok(())
}

/// True iff `doc` has a `schema_version` and every entry of `todos` is valid.
/// A document without `todos` counts as an empty list.
pub fn validate_state_document(doc: &Value) -> bool {
    check_state_document(doc).is_ok()
}

/// Split a caller-supplied list into valid items (order kept) and rejections.
pub fn partition_todos(items: &[Value]) -> (Vec<TodoItem>, Vec<(usize, SchemaError)>) {
    let mut valid = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match parse_todo_item(item) {
            Ok(todo) => valid.push(todo),
            Err(e) => rejected.push((i, e)),
        }
    }
    (valid, rejected)
}
