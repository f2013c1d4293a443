use clap::{Parser, Subcommand};
use libfilehist_core::BackendKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filehist", about = "Browse the history of a single file", version)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/filehist/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured backend (cli, libgit2, github, gitlab)
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Log level for stderr logging (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch one page of a file's history
    Page {
        /// File to inspect
        path: String,

        /// Commits per page (default: configured page size)
        #[arg(long)]
        limit: Option<usize>,

        /// Start strictly before this commit
        #[arg(long)]
        before: Option<String>,

        /// Include file contents in JSON output
        #[arg(long)]
        content: bool,
    },

    /// Step through a file's history diff by diff
    Browse {
        /// File to browse
        path: String,

        /// Path to the filehist-host binary
        #[arg(long)]
        host: Option<PathBuf>,

        /// Terminal width used for split diffs
        #[arg(long, default_value = "120")]
        width: usize,
    },

    /// Show the effective configuration
    Config,
}
