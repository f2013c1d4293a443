use libfilehist_core::HistError;
use libfilehist_git::BackendError;
use libfilehist_ipc::IpcError;
use libfilehist_view::ViewError;
use thiserror::Error;

/// Errors surfaced by the `filehist` commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] HistError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("host: {0}")]
    Ipc(#[from] IpcError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn error_code(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.error_code(),
            CliError::Backend(e) => e.error_code(),
            CliError::Ipc(e) => e.error_code(),
            CliError::View(e) => e.error_code(),
            CliError::Io(_) => "io_error",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(e) => e.exit_code(),
            CliError::Backend(e) => e.exit_code(),
            CliError::Ipc(_) | CliError::View(_) | CliError::Io(_) => 5,
        }
    }

    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            CliError::Config(e) => e.suggestions(),
            CliError::Backend(BackendError::Unavailable(msg)) if msg.contains("git") => vec![
                "Check that git is installed and the file is inside a working tree",
                "Or set [backend] kind = \"libgit2\" in config.toml",
            ],
            CliError::Backend(e) if e.is_retryable() => vec!["Retry the command"],
            CliError::Backend(BackendError::ContentTooLarge { .. }) => vec![
                "Lower --limit or raise max_page_bytes / max_blob_bytes in config.toml",
            ],
            CliError::Ipc(IpcError::Launch(_)) => vec![
                "Make sure filehist-host is installed next to filehist or on PATH",
            ],
            _ => vec![],
        }
    }
}
