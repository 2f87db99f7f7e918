mod cmd_bridge;
mod cmd_gc;
mod cmd_show;

use clap::{Parser, Subcommand};
use tally_bridge_claude::BridgeConfig;
use tally_store::DebugLog;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Persistent todo state for coding-assistant sessions"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hook entrypoint (called by the assistant host)
    Hook {
        #[command(subcommand)]
        cmd: HookCmd,
    },
    /// Show the current project's todos
    Show {
        /// Output the raw state document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete state files not updated within the retention window
    Gc {
        /// Preview without deleting
        #[arg(long)]
        dry_run: bool,
        /// Override retention days (default: TALLY_RETENTION_DAYS or 7)
        #[arg(long)]
        keep_days: Option<u32>,
    },
    /// Delete the current project's state file
    Clear,
    /// Print the current project's state file path
    Path,
}

#[derive(Subcommand)]
enum HookCmd {
    /// Claude Code hook: read the event from stdin, print the response
    Claude,
}

/// Route `tracing` output into the rotating debug log. The hook's stdout is
/// reserved for the host, so nothing goes to the terminal.
fn init_logging(config: &BridgeConfig) {
    let log = DebugLog::from_config(&config.store);
    let filter = EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(move || log.writer())
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BridgeConfig::from_env();
    init_logging(&config);

    match cli.cmd {
        Command::Hook { cmd } => match cmd {
            HookCmd::Claude => cmd_bridge::hook_claude(&config),
        },
        Command::Show { json } => cmd_show::show(&config, &current_dir()?, json),
        Command::Gc { dry_run, keep_days } => cmd_gc::execute(&cmd_gc::GcParams {
            config: &config.store,
            dry_run,
            keep_days,
        }),
        Command::Clear => cmd_show::clear(&config, &current_dir()?),
        Command::Path => cmd_show::path(&config, &current_dir()?),
    }
}

fn current_dir() -> anyhow::Result<String> {
    Ok(std::env::current_dir()?.to_string_lossy().into_owned())
}
