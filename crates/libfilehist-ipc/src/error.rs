//! IPC error types

use thiserror::Error;

/// Errors that can occur on the host/display channel
#[derive(Error, Debug)]
pub enum IpcError {
    /// A message arrived that the current session state does not allow
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// A frame was not a valid message
    #[error("Malformed message: {0}")]
    Decode(String),

    /// The peer closed the channel
    #[error("Channel closed")]
    Closed,

    /// Host process could not be started
    #[error("Failed to launch host: {0}")]
    Launch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable error codes for logs and JSON output
pub mod codes {
    pub const PROTOCOL_VIOLATION: &str = "protocol_violation";
    pub const DECODE_ERROR: &str = "decode_error";
    pub const CLOSED: &str = "closed";
    pub const LAUNCH_FAILED: &str = "launch_failed";
    pub const IO_ERROR: &str = "io_error";
    pub const INTERNAL: &str = "internal";
}

impl IpcError {
    pub fn error_code(&self) -> &'static str {
        match self {
            IpcError::ProtocolViolation(_) => codes::PROTOCOL_VIOLATION,
            IpcError::Decode(_) => codes::DECODE_ERROR,
            IpcError::Closed => codes::CLOSED,
            IpcError::Launch(_) => codes::LAUNCH_FAILED,
            IpcError::Io(_) => codes::IO_ERROR,
            IpcError::Json(_) => codes::INTERNAL,
        }
    }

    /// Whether the session can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IpcError::ProtocolViolation(_) | IpcError::Decode(_))
    }
}
