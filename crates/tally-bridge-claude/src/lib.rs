//! Claude Code integration for the Tally todo store.

pub mod prompt;
pub mod render;

mod dispatch;
mod parse;

pub use dispatch::{hook_entrypoint_from_stdin, BridgeConfig, HookResult};
