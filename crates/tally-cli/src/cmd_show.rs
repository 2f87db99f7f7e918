use tally_bridge_claude::render::marker;
use tally_bridge_claude::BridgeConfig;
use tally_core::StateDocument;
use tally_store::StateManager;

fn manager(config: &BridgeConfig, cwd: &str) -> StateManager {
    config.manager_for(cwd, "")
}

/// Human-readable listing of every todo, completed ones included.
fn format_document(doc: &StateDocument) -> String {
    let mut lines = vec![
        format!("Project: {} ({})", doc.project_name, doc.project_id),
        format!("Updated: {}", doc.updated_at),
        format!("Session: {}", doc.session_id),
    ];
    if doc.todos.is_empty() {
        lines.push("(no todos)".to_string());
    } else {
        lines.push(String::new());
        lines.extend(doc.todos.iter().map(|t| {
            format!(
                "  {} [{}] {}",
                marker(t.status),
                t.status.as_str().to_uppercase(),
                t.content
            )
        }));
    }
    lines.join("\n")
}

/// `tally show`
pub fn show(config: &BridgeConfig, cwd: &str, json: bool) -> anyhow::Result<()> {
    let doc = manager(config, cwd).load();
    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{}", format_document(&doc));
    }
    Ok(())
}

/// `tally clear`
pub fn clear(config: &BridgeConfig, cwd: &str) -> anyhow::Result<()> {
    let m = manager(config, cwd);
    if !m.clear() {
        anyhow::bail!("failed to remove {}", m.state_path().display());
    }
    println!("Cleared todos for {}", m.project().name);
    Ok(())
}

/// `tally path`
pub fn path(config: &BridgeConfig, cwd: &str) -> anyhow::Result<()> {
    println!("{}", manager(config, cwd).state_path().display());
    Ok(())
}
