pub mod browse;
pub mod config;
pub mod page;

use std::path::PathBuf;

use libfilehist_core::config::resolve_config;
use libfilehist_core::HistConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Effective configuration: config file plus global overrides
pub fn load_config(cli: &Cli) -> Result<HistConfig, CliError> {
    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(kind) = cli.backend {
        config.backend.kind = kind;
    }
    config.validate()?;
    Ok(config)
}

/// Local backends take an absolute path; hosted ones keep it repo-relative
pub fn resolve_path(config: &HistConfig, path: &str) -> Result<String, CliError> {
    if config.backend.kind.is_hosted() {
        return Ok(path.to_string());
    }
    let file = PathBuf::from(path);
    if file.is_absolute() {
        Ok(path.to_string())
    } else {
        Ok(std::env::current_dir()?.join(file).display().to_string())
    }
}
