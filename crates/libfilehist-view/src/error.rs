use thiserror::Error;

/// Errors from display-side components
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("highlighter error: {0}")]
    Highlighter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViewError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ViewError::Highlighter(_) => "highlighter_error",
            ViewError::Io(_) => "io_error",
            ViewError::Json(_) => "internal_error",
        }
    }
}
