use std::io::Read;

use tally_bridge_claude::BridgeConfig;

/// `tally hook claude`: read stdin, dispatch hook
pub fn hook_claude(config: &BridgeConfig) -> anyhow::Result<()> {
    let mut stdin_buf = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut stdin_buf) {
        tracing::warn!(error = %e, "stdin read error");
        return Ok(());
    }

    tracing::debug!(
        bytes = stdin_buf.len(),
        head = preview(&stdin_buf, 200),
        "hook stdin"
    );

    match tally_bridge_claude::hook_entrypoint_from_stdin(&stdin_buf, config) {
        Ok(result) => {
            match &result.stdout {
                Some(output) => {
                    tracing::debug!(bytes = output.len(), "hook ok with output");
                    print!("{output}");
                }
                None => tracing::debug!("hook ok (no output)"),
            }
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "hook dispatch failed");
            // Exit 0 on internal errors, never block the host agent
            Ok(())
        }
    }
}

/// At most `max` bytes of `s`, cut on a char boundary.
fn preview(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
