use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Offline-first billing: inspect local data and sync it with the cloud")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Skip the once-per-session automatic sync
    #[arg(long, global = true)]
    pub no_auto_sync: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile local data with the remote store
    Sync {
        /// Print the sync report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show sign-in state, auto-sync preference and local record counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export local data as JSON
    Export {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Change local preferences
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub const fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Sync automatically once per sign-in session
    AutoSync {
        #[arg(value_enum)]
        state: Toggle,
    },
}
