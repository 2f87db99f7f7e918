//! Field access over hook payloads.

use serde_json::Value;

// ── Hook stdin parsing ──

/// Parse the stdin JSON from a Claude Code hook.
pub(crate) fn parse_hook_stdin(stdin: &str) -> anyhow::Result<Value> {
    let val: Value = serde_json::from_str(stdin)?;
    Ok(val)
}

/// Look up a field by its snake_case name, falling back to camelCase.
/// Claude Code sends snake_case (e.g. `hook_event_name`), some wrappers
/// forward camelCase (e.g. `hookEventName`).
pub(crate) fn get_field<'a>(v: &'a Value, snake_key: &str) -> Option<&'a Value> {
    v.get(snake_key)
        .or_else(|| v.get(snake_to_camel(snake_key)))
}

/// Get a string field, or `""` when missing or not a string.
pub(crate) fn get_str(v: &Value, snake_key: &str) -> String {
    get_field(v, snake_key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

pub(crate) fn get_bool(v: &Value, snake_key: &str) -> bool {
    get_field(v, snake_key)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// `tool_input.todos` of a `TodoWrite` call; `None` when absent or not a list.
pub(crate) fn get_tool_todos(v: &Value) -> Option<Vec<Value>> {
    get_field(v, "tool_input")
        .and_then(|input| input.get("todos"))
        .and_then(Value::as_array)
        .cloned()
}

pub(crate) fn snake_to_camel(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for ch in s.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snake_to_camel_converts_correctly() {
        assert_eq!(snake_to_camel("hook_event_name"), "hookEventName");
        assert_eq!(snake_to_camel("session_id"), "sessionId");
        assert_eq!(snake_to_camel("stop_hook_active"), "stopHookActive");
        assert_eq!(snake_to_camel("cwd"), "cwd");
        assert_eq!(snake_to_camel("tool_input"), "toolInput");
    }

    #[test]
    fn fields_fall_back_to_camel_case() {
        let v = json!({"hookEventName": "Stop", "stopHookActive": true, "cwd": "/w"});
        assert_eq!(get_str(&v, "hook_event_name"), "Stop");
        assert!(get_bool(&v, "stop_hook_active"));
        assert_eq!(get_str(&v, "cwd"), "/w");
        assert_eq!(get_str(&v, "session_id"), "");
        assert!(!get_bool(&v, "missing"));
    }

    #[test]
    fn tool_todos_extraction() {
        let v = json!({
            "tool_name": "TodoWrite",
            "tool_input": {"todos": [{"content": "A"}, {"content": "B"}]}
        });
        assert_eq!(get_tool_todos(&v).unwrap().len(), 2);
        let cleared = json!({"toolInput": {"todos": []}});
        assert_eq!(get_tool_todos(&cleared), Some(vec![]));
        assert!(get_tool_todos(&json!({"tool_input": {"todos": "nope"}})).is_none());
        assert!(get_tool_todos(&json!({})).is_none());
    }

    #[test]
    fn malformed_stdin_is_an_error() {
        assert!(parse_hook_stdin("{ not json").is_err());
        assert!(parse_hook_stdin(r#"{"a": 1}"#).is_ok());
    }
}
