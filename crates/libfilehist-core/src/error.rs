use thiserror::Error;

/// Main error type for filehist core operations
#[derive(Debug, Error)]
pub enum HistError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HistError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            HistError::InvalidArgs(_) => "invalid_args",
            HistError::NotFound(_) => "not_found",
            HistError::Io(_) => "io_error",
            HistError::Json(_) => "internal_error",
            HistError::TomlParse(_) => "invalid_args",
            HistError::TomlSerialize(_) => "internal_error",
            HistError::Internal(_) => "internal_error",
        }
    }

    /// Get the exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            HistError::InvalidArgs(_) | HistError::TomlParse(_) => 2,
            HistError::NotFound(_) => 3,
            HistError::Io(_) => 5,
            _ => 1,
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            HistError::TomlParse(_) => vec![
                "Check the syntax of your filehist config.toml",
                "Or pass --config to point at a different file",
            ],
            HistError::NotFound(msg) if msg.contains("repository") => vec![
                "Run the command from inside a git working tree",
            ],
            _ => vec![],
        }
    }
}
