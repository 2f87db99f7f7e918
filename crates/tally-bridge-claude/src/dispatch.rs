//! Claude Code hook dispatch: one handler per `hook_event_name`.

use tally_store::{
    cleanup, sweep_stale_temps, ProjectKey, StateManager, StoreConfig, PROJECT_DIR_ENV,
    SESSION_ID_ENV, TEMP_FILE_MAX_AGE,
};

use crate::parse::*;
use crate::prompt::{self, PromptKind};
use crate::render;

// ── Hook Result ──

/// Result from a hook dispatch.
///
/// `stdout` is the JSON string to print for Claude Code; `None` means the
/// hook has nothing to say and the host proceeds normally.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HookResult {
    pub stdout: Option<String>,
}

impl HookResult {
    /// Construct a result with stdout (normal output, exit 0).
    pub fn output(stdout: String) -> Self {
        Self {
            stdout: Some(stdout),
        }
    }

    /// Construct an empty result (no output, exit 0).
    pub fn empty() -> Self {
        Self::default()
    }
}

// ── Bridge Config ──

/// Everything the bridge needs from its environment, resolved once.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub store: StoreConfig,
    /// `CLAUDE_PROJECT_DIR`: wins over the payload's `cwd`.
    pub project_dir: Option<String>,
    /// `CLAUDE_SESSION_ID`: wins over the payload's `session_id`.
    pub session_id: Option<String>,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            store: StoreConfig::from_env(),
            project_dir: non_empty(PROJECT_DIR_ENV),
            session_id: non_empty(SESSION_ID_ENV),
        }
    }

    pub fn with_store(store: StoreConfig) -> Self {
        Self {
            store,
            project_dir: None,
            session_id: None,
        }
    }

    /// Build the state manager for the project a hook payload refers to.
    pub fn manager_for(&self, cwd: &str, payload_session: &str) -> StateManager {
        let project = ProjectKey::resolve(self.project_dir.as_deref(), Some(cwd));
        let session = self
            .session_id
            .as_deref()
            .or(Some(payload_session).filter(|s| !s.is_empty()));
        StateManager::new(&self.store, project, session)
    }
}

// ── Hook dispatch ──

/// Main hook entrypoint: parse stdin, dispatch by hook_event_name.
/// Returns `HookResult` with optional stdout JSON. Only unparseable stdin is
/// an error; the caller must still let the host continue.
pub fn hook_entrypoint_from_stdin(
    stdin: &str,
    config: &BridgeConfig,
) -> anyhow::Result<HookResult> {
    if stdin.trim().is_empty() {
        return Ok(HookResult::empty());
    }
    let raw = parse_hook_stdin(stdin)?;

    let hook_event_name = get_str(&raw, "hook_event_name");
    let session_id = get_str(&raw, "session_id");
    let cwd = get_str(&raw, "cwd");
    let manager = config.manager_for(&cwd, &session_id);

    match hook_event_name.as_str() {
        "SessionStart" => dispatch_session_start(&manager, &config.store, &get_str(&raw, "source")),
        "UserPromptSubmit" => dispatch_user_prompt_submit(&manager, &get_str(&raw, "prompt")),
        "PostToolUse" => dispatch_post_tool_use(&manager, &raw),
        "PreCompact" => {
            let trigger = get_str(&raw, "trigger");
            let trigger = if trigger.is_empty() { "unknown" } else { trigger.as_str() };
            tracing::debug!(trigger, "PreCompact hook triggered");
            manager.mark_compaction(trigger);
            // PreCompact output cannot carry context; the flag is the side effect.
            Ok(HookResult::empty())
        }
        "Stop" => dispatch_stop(&manager, get_bool(&raw, "stop_hook_active")),
        _ => Ok(HookResult::empty()),
    }
}

fn additional_context(event_name: &str, context: &str) -> anyhow::Result<HookResult> {
    let output = serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": event_name,
            "additionalContext": context
        }
    });
    Ok(HookResult::output(serde_json::to_string(&output)?))
}

/// Dispatch SessionStart - sweep on cold start, then restore outstanding todos.
fn dispatch_session_start(
    manager: &StateManager,
    store: &StoreConfig,
    source: &str,
) -> anyhow::Result<HookResult> {
    tracing::debug!(source, "SessionStart hook triggered");

    // Cold start only: resume/compact happen too often to justify a sweep.
    if source == "startup" {
        let removed = cleanup(&store.state_dir, store.retention);
        let temps = sweep_stale_temps(&store.state_dir, TEMP_FILE_MAX_AGE);
        if removed > 0 || temps > 0 {
            tracing::debug!(removed, temps, "cleaned up old state files");
        }
    }

    let doc = manager.load();
    let incomplete = doc.incomplete();
    let reason = render::restore_reason(source);
    if incomplete.is_empty() && reason.is_none() {
        return Ok(HookResult::empty());
    }

    let context = render::render_todo_context(&doc, &incomplete, true);
    if context.is_empty() {
        return Ok(HookResult::empty());
    }
    let context = match reason {
        Some(r) => render::wrap_session_restored(r, &context),
        None => context,
    };
    additional_context("SessionStart", &context)
}

/// Dispatch UserPromptSubmit - skill reminder, or active todos plus a task nudge.
fn dispatch_user_prompt_submit(
    manager: &StateManager,
    prompt: &str,
) -> anyhow::Result<HookResult> {
    tracing::debug!(prompt_len = prompt.len(), "UserPromptSubmit hook triggered");

    let mut parts: Vec<String> = Vec::new();
    match prompt::classify(prompt) {
        PromptKind::Trivial => {
            tracing::debug!("trivial prompt detected, skipping reminder");
            return Ok(HookResult::empty());
        }
        PromptKind::Skill(skill) => {
            tracing::debug!(skill = %skill, "skill invocation detected");
            parts.push(render::render_skill_reminder(&skill));
        }
        kind => {
            if let Some(active) = render::render_active_todos(&manager.get_incomplete()) {
                parts.push(active);
            }
            if kind == PromptKind::Task {
                parts.push(render::render_task_reminder());
            }
        }
    }

    if parts.is_empty() {
        return Ok(HookResult::empty());
    }
    additional_context("UserPromptSubmit", &parts.join("\n"))
}

/// Dispatch PostToolUse - persist the full list reported by `TodoWrite`.
fn dispatch_post_tool_use(
    manager: &StateManager,
    raw: &serde_json::Value,
) -> anyhow::Result<HookResult> {
    if get_str(raw, "tool_name") != "TodoWrite" {
        return Ok(HookResult::empty());
    }
    let Some(todos) = get_tool_todos(raw) else {
        tracing::debug!("PostToolUse[TodoWrite]: no todos in input");
        return Ok(HookResult::empty());
    };
    tracing::debug!("PostToolUse[TodoWrite]: persisting {} todos", todos.len());
    if manager.update_todos(&todos) {
        tracing::debug!("PostToolUse[TodoWrite]: state persisted successfully");
    } else {
        tracing::warn!("PostToolUse[TodoWrite]: failed to persist state");
    }
    // Never block the assistant on persistence.
    Ok(HookResult::empty())
}

/// Dispatch Stop - block while any todo is still marked in progress.
fn dispatch_stop(manager: &StateManager, stop_hook_active: bool) -> anyhow::Result<HookResult> {
    if stop_hook_active {
        tracing::debug!("Stop hook already active, allowing stop to prevent loop");
        return Ok(HookResult::empty());
    }

    let doc = manager.load();
    let in_progress = doc.in_progress();
    let incomplete = doc.incomplete();
    tracing::debug!(
        incomplete = incomplete.len(),
        in_progress = in_progress.len(),
        "Stop hook triggered"
    );

    if in_progress.is_empty() {
        if !incomplete.is_empty() {
            tracing::debug!("{} pending todos, allowing stop", incomplete.len());
        }
        return Ok(HookResult::empty());
    }

    let output = serde_json::json!({
        "decision": "block",
        "reason": render::render_stop_reason(&in_progress)
    });
    Ok(HookResult::output(serde_json::to_string(&output)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn config(dir: &std::path::Path) -> BridgeConfig {
        BridgeConfig {
            store: StoreConfig::with_state_dir(dir),
            project_dir: Some("/work/demo-project".into()),
            session_id: None,
        }
    }

    fn run(cfg: &BridgeConfig, payload: Value) -> HookResult {
        hook_entrypoint_from_stdin(&payload.to_string(), cfg).unwrap()
    }

    fn context_of(result: &HookResult) -> String {
        let out: Value = serde_json::from_str(result.stdout.as_ref().unwrap()).unwrap();
        out["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn write_todos(cfg: &BridgeConfig, todos: Value) {
        let result = run(
            cfg,
            json!({
                "session_id": "s1",
                "hook_event_name": "PostToolUse",
                "cwd": "/elsewhere",
                "tool_name": "TodoWrite",
                "tool_input": {"todos": todos}
            }),
        );
        assert_eq!(result, HookResult::empty());
    }

    #[test]
    fn empty_stdin_is_noop_and_garbage_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        assert_eq!(hook_entrypoint_from_stdin("  ", &cfg).unwrap(), HookResult::empty());
        assert!(hook_entrypoint_from_stdin("{ nope", &cfg).is_err());
    }

    #[test]
    fn todo_write_persists_and_session_start_restores() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        write_todos(
            &cfg,
            json!([
                {"content": "Write parser", "status": "in_progress", "activeForm": "Writing parser"},
                {"content": "Broken"},
                {"content": "Add tests", "status": "pending", "activeForm": "Adding tests"}
            ]),
        );

        let m = cfg.manager_for("", "");
        let doc = m.load();
        assert_eq!(doc.todos.len(), 2);
        assert_eq!(doc.session_id, "s1");
        assert_eq!(doc.project_name, "demo-project");

        let result = run(&cfg, json!({"hook_event_name": "SessionStart", "source": "startup"}));
        let ctx = context_of(&result);
        assert!(ctx.starts_with("<current-todos>\nProject: demo-project"));
        assert!(ctx.contains("→ [IN_PROGRESS] Write parser"));
        assert!(ctx.contains("○ [PENDING] Add tests"));
        assert!(ctx.contains("<todo-protocol>"));
    }

    #[test]
    fn session_start_without_todos() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        let startup = run(&cfg, json!({"hook_event_name": "SessionStart", "source": "startup"}));
        assert!(startup.stdout.is_none());

        let compact = run(&cfg, json!({"hook_event_name": "SessionStart", "source": "compact"}));
        let ctx = context_of(&compact);
        assert!(ctx.starts_with("<session-restored reason=\"context_compacted\">\n<todo-protocol>"));
        assert!(ctx.ends_with("</session-restored>"));
    }

    #[test]
    fn session_start_resume_wraps_context() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        write_todos(&cfg, json!([{"content": "A", "status": "pending", "activeForm": "a"}]));
        let result = run(&cfg, json!({"hookEventName": "SessionStart", "source": "resume"}));
        let ctx = context_of(&result);
        assert!(ctx.starts_with("<session-restored reason=\"session_resumed\">\n<current-todos>"));
    }

    #[test]
    fn startup_sweeps_stale_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        let stale = tmp.path().join("todos_stale.json");
        std::fs::write(
            &stale,
            json!({"schema_version": 1, "todos": [], "updated_at": "2001-01-01T00:00:00Z"}).to_string(),
        )
        .unwrap();

        run(&cfg, json!({"hook_event_name": "SessionStart", "source": "resume"}));
        assert!(stale.exists());
        run(&cfg, json!({"hook_event_name": "SessionStart", "source": "startup"}));
        assert!(!stale.exists());
    }

    #[test]
    fn todo_write_with_empty_list_clears() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        write_todos(&cfg, json!([{"content": "A", "status": "pending", "activeForm": "a"}]));
        write_todos(&cfg, json!([]));
        assert!(cfg.manager_for("", "").load().todos.is_empty());
    }

    #[test]
    fn other_tools_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        let result = run(
            &cfg,
            json!({"hook_event_name": "PostToolUse", "tool_name": "Bash", "tool_input": {"todos": []}}),
        );
        assert!(result.stdout.is_none());
        assert!(!cfg.manager_for("", "").state_path().exists());
    }

    #[test]
    fn stop_blocks_on_in_progress() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        write_todos(
            &cfg,
            json!([
                {"content": "Migrate db", "status": "in_progress", "activeForm": "Migrating"},
                {"content": "Later", "status": "pending", "activeForm": "Later-ing"}
            ]),
        );

        let result = run(&cfg, json!({"hook_event_name": "Stop"}));
        let out: Value = serde_json::from_str(result.stdout.as_ref().unwrap()).unwrap();
        assert_eq!(out["decision"], "block");
        let reason = out["reason"].as_str().unwrap();
        assert!(reason.contains("1 task(s)"));
        assert!(reason.contains("  - Migrate db"));
        assert!(!reason.contains("Later"));

        let looped = run(&cfg, json!({"hook_event_name": "Stop", "stop_hook_active": true}));
        assert!(looped.stdout.is_none());
    }

    #[test]
    fn stop_allows_with_only_pending() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        write_todos(&cfg, json!([{"content": "Later", "status": "pending", "activeForm": "l"}]));
        assert!(run(&cfg, json!({"hook_event_name": "Stop"})).stdout.is_none());
    }

    #[test]
    fn pre_compact_flags_document() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        write_todos(&cfg, json!([{"content": "A", "status": "in_progress", "activeForm": "a"}]));
        let result = run(&cfg, json!({"hook_event_name": "PreCompact", "trigger": "auto"}));
        assert!(result.stdout.is_none());
        let doc = cfg.manager_for("", "").load();
        assert_eq!(doc.flag("last_compact"), Some(&json!(true)));
        assert_eq!(doc.flag("compact_trigger"), Some(&json!("auto")));
    }

    #[test]
    fn user_prompt_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        let prompt = |p: &str| run(&cfg, json!({"hook_event_name": "UserPromptSubmit", "prompt": p}));

        assert!(prompt("thanks").stdout.is_none());
        assert!(prompt("summarize yesterday's notes").stdout.is_none());

        let skill = context_of(&prompt("/deploy the service"));
        assert!(skill.contains("<skill-todo-enforcement skill=\"deploy\">"));

        let task = context_of(&prompt("implement the cache layer"));
        assert_eq!(task, render::render_task_reminder());

        write_todos(&cfg, json!([{"content": "Cache", "status": "in_progress", "activeForm": "c"}]));
        let with_todos = context_of(&prompt("implement the cache layer"));
        assert!(with_todos.starts_with("<active-todos>\n  → Cache\n</active-todos>\n<todo-reminder>"));
    }

    #[test]
    fn session_id_override_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = config(tmp.path());
        cfg.session_id = Some("env-session".into());
        write_todos(&cfg, json!([{"content": "A", "status": "pending", "activeForm": "a"}]));
        assert_eq!(cfg.manager_for("", "").load().session_id, "env-session");
    }

    #[test]
    fn cwd_used_without_project_override() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = BridgeConfig::with_store(StoreConfig::with_state_dir(tmp.path()));
        let a = cfg.manager_for("/repo/a", "");
        let b = cfg.manager_for("/repo/b", "");
        assert_eq!(a.project().name, "a");
        assert_ne!(a.state_path(), b.state_path());
    }
}
