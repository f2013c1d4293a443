use libfilehist_core::config::default_config_path;
use libfilehist_core::HistError;
use serde::Serialize;

use crate::cli::Cli;
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct ConfigOutput {
    /// File the settings were read from, if any
    path: Option<String>,
    config: libfilehist_core::HistConfig,
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let path = cli
        .config
        .clone()
        .or_else(default_config_path)
        .filter(|p| p.exists())
        .map(|p| p.display().to_string());

    let text = toml::to_string_pretty(&config).map_err(HistError::from)?;
    match &path {
        Some(path) => print_human(cli, &format!("# {}", path)),
        None => print_human(cli, "# defaults (no config file)"),
    }
    print_human(cli, text.trim_end());

    output_success(cli, ConfigOutput { path, config })
}
