//! Text blocks injected into the assistant's context.
//!
//! Every function here is a pure function of its inputs.

use tally_core::{StateDocument, TodoItem, TodoStatus};

/// Marker for the todo currently being worked on.
pub const MARKER_IN_PROGRESS: &str = "→";
/// Marker for a todo that has not started.
pub const MARKER_PENDING: &str = "○";
/// Marker for a finished todo.
pub const MARKER_COMPLETED: &str = "✓";

pub fn marker(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::InProgress => MARKER_IN_PROGRESS,
        TodoStatus::Pending => MARKER_PENDING,
        TodoStatus::Completed => MARKER_COMPLETED,
    }
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() {
        "Unknown"
    } else {
        s
    }
}

/// Fixed reminder of how the task list is expected to be kept.
pub fn protocol() -> String {
    [
        "<todo-protocol>",
        "MANDATORY: For multi-step tasks, use TodoWrite IMMEDIATELY:",
        "1. Create ALL deliverables as separate todo items BEFORE starting",
        "2. Mark in_progress BEFORE working, completed AFTER finishing",
        "3. Never batch completions - mark done immediately",
        "</todo-protocol>",
    ]
    .join("\n")
}

/// Summary of outstanding work for `doc`, optionally followed by the protocol
/// block. Returns an empty string when there is nothing to say.
pub fn render_todo_context(
    doc: &StateDocument,
    incomplete: &[TodoItem],
    include_protocol: bool,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !incomplete.is_empty() {
        parts.push("<current-todos>".to_string());
        parts.push(format!("Project: {}", or_unknown(&doc.project_name)));
        parts.push(format!("Last updated: {}", or_unknown(&doc.updated_at)));
        parts.push(String::new());
        for todo in incomplete {
            parts.push(format!(
                "  {} [{}] {}",
                marker(todo.status),
                todo.status.as_str().to_uppercase(),
                todo.content
            ));
        }
        parts.push("</current-todos>".to_string());
        parts.push(String::new());
    }

    if include_protocol {
        parts.push(protocol());
    }

    parts.join("\n")
}

/// Reminder injected when a prompt invokes a named skill.
pub fn render_skill_reminder(skill: &str) -> String {
    format!(
        "<skill-todo-enforcement skill=\"{skill}\">\n\
         SKILL INVOKED: {skill}\n\
         \n\
         MANDATORY FIRST ACTION: Use TodoWrite to list ALL expected deliverables.\n\
         Skills often produce multiple outputs. Each output = separate todo item.\n\
         \n\
         Example for a skill that produces a report and its summary:\n\
         - Todo 1: \"Write the report\"\n\
         - Todo 2: \"Write the summary\"\n\
         \n\
         Do NOT proceed with the skill until todos are created.\n\
         </skill-todo-enforcement>"
    )
}

/// Compact per-prompt list of unfinished todos. `None` when there are none.
pub fn render_active_todos(incomplete: &[TodoItem]) -> Option<String> {
    if incomplete.is_empty() {
        return None;
    }
    let mut lines = vec!["<active-todos>".to_string()];
    lines.extend(
        incomplete
            .iter()
            .map(|t| format!("  {} {}", marker(t.status), t.content)),
    );
    lines.push("</active-todos>".to_string());
    Some(lines.join("\n"))
}

pub fn render_task_reminder() -> String {
    "<todo-reminder>\n\
     Multi-step task detected. Use TodoWrite to list ALL deliverables first.\n\
     </todo-reminder>"
        .to_string()
}

/// Map a SessionStart `source` to the restore reason shown to the assistant.
pub fn restore_reason(source: &str) -> Option<&'static str> {
    match source {
        "compact" => Some("context_compacted"),
        "resume" => Some("session_resumed"),
        _ => None,
    }
}

pub fn wrap_session_restored(reason: &str, content: &str) -> String {
    format!("<session-restored reason=\"{reason}\">\n{content}\n</session-restored>")
}

/// Explanation returned to the host when stopping is blocked.
pub fn render_stop_reason(in_progress: &[TodoItem]) -> String {
    let task_list = in_progress
        .iter()
        .map(|t| format!("  - {}", t.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "STOP BLOCKED: You have {} task(s) marked as in_progress:\n\
         {task_list}\n\
         \n\
         Please either:\n\
         1. Complete these tasks and mark them as 'completed' using TodoWrite\n\
         2. Or mark them as 'pending' if you cannot complete them now\n\
         \n\
         Do not stop until all in_progress tasks are resolved.",
        in_progress.len()
    )
}
