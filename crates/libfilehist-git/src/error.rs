use thiserror::Error;

/// Errors that can occur while fetching a window of history
#[derive(Debug, Error)]
pub enum BackendError {
    /// Process, network or transport failure
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The path has no history at all
    #[error("no history for path: {0}")]
    PathNotFound(String),

    /// A selected revision's blob could not be retrieved
    #[error("content unavailable at {hash}: {reason}")]
    ContentUnavailable { hash: String, reason: String },

    /// A blob or page exceeded its configured ceiling
    #[error("content too large: more than {limit} bytes ({actual} read)")]
    ContentTooLarge { limit: usize, actual: usize },

    #[error("invalid limit: {0} (must be at least 1)")]
    InvalidLimit(usize),

    /// The cursor is not a revision id this backend accepts
    #[error("invalid cursor: {0:?}")]
    InvalidCursor(String),

    #[error("backend timed out after {0}ms")]
    Timeout(u64),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Stable error code for logs and JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            BackendError::Unavailable(_)
            | BackendError::Timeout(_)
            | BackendError::Git(_)
            | BackendError::Io(_)
            | BackendError::Http(_) => "backend_unavailable",
            BackendError::PathNotFound(_) => "path_not_found",
            BackendError::ContentUnavailable { .. } => "content_unavailable",
            BackendError::ContentTooLarge { .. } => "content_too_large",
            BackendError::InvalidLimit(_) => "invalid_limit",
            BackendError::InvalidCursor(_) => "invalid_cursor",
            BackendError::Parse(_) | BackendError::Json(_) => "parse_error",
        }
    }

    /// Whether re-issuing the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.error_code(), "backend_unavailable" | "content_unavailable")
    }

    /// Exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            BackendError::InvalidLimit(_) | BackendError::InvalidCursor(_) => 2,
            BackendError::PathNotFound(_) => 3,
            BackendError::ContentTooLarge { .. } => 4,
            _ => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_codes() {
        assert_eq!(BackendError::Timeout(10).error_code(), "backend_unavailable");
        assert_eq!(
            BackendError::ContentUnavailable {
                hash: "abc".into(),
                reason: "gone".into()
            }
            .error_code(),
            "content_unavailable"
        );
        assert_eq!(
            BackendError::ContentTooLarge { limit: 1, actual: 2 }.error_code(),
            "content_too_large"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(BackendError::Unavailable("down".into()).is_retryable());
        assert!(!BackendError::InvalidLimit(0).is_retryable());
        assert!(!BackendError::ContentTooLarge { limit: 1, actual: 2 }.is_retryable());
    }
}
