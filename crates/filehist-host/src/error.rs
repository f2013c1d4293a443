//! Host-specific error types

use libfilehist_core::HistError;
use libfilehist_git::BackendError;
use libfilehist_ipc::IpcError;
use thiserror::Error;

/// Errors that end a host session
#[derive(Error, Debug)]
pub enum HostError {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] HistError),

    /// Backend could not be constructed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Transport to the display failed
    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    pub fn error_code(&self) -> &'static str {
        match self {
            HostError::Config(e) => e.error_code(),
            HostError::Backend(e) => e.error_code(),
            HostError::Ipc(e) => e.error_code(),
            HostError::Io(_) => "io_error",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            HostError::Config(e) => e.exit_code(),
            HostError::Backend(e) => e.exit_code(),
            HostError::Ipc(_) | HostError::Io(_) => 5,
        }
    }
}
