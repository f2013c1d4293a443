//! filehist-host - serves one file's history over stdio
//!
//! The display surface talks to the host with newline-delimited JSON on
//! stdin/stdout. Logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use filehist_host::{HostError, Session};
use libfilehist_core::config::resolve_config;
use libfilehist_core::BackendKind;
use libfilehist_git::Pager;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "filehist-host", about = "filehist history host", version)]
struct Cli {
    /// File whose history to serve
    #[arg(long)]
    file: String,

    /// Config file (default: $XDG_CONFIG_HOME/filehist/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured backend (cli, libgit2, github, gitlab)
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Override the configured page size
    #[arg(long)]
    page_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries the protocol
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("filehist-host starting");

    if let Err(e) = run(cli).await {
        error!(code = e.error_code(), "{}", e);
        std::process::exit(e.exit_code());
    }

    info!("filehist-host stopped");
}

async fn run(cli: Cli) -> Result<(), HostError> {
    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(kind) = cli.backend {
        config.backend.kind = kind;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    config.validate()?;

    // Local backends resolve the path on disk; hosted ones take it repo-relative
    let path = if config.backend.kind.is_hosted() {
        cli.file
    } else {
        let file = PathBuf::from(&cli.file);
        if file.is_absolute() {
            cli.file
        } else {
            std::env::current_dir()?.join(file).display().to_string()
        }
    };

    let pager = Pager::from_config(&config, path)?;
    info!(backend = %config.backend.kind, page_size = pager.page_size(), "pager ready");

    let session = Session::new(pager);
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    session.run(reader, writer, shutdown_signal()).await?;
    Ok(())
}

/// Completes on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Received shutdown signal");
}
