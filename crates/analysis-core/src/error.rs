use thiserror::Error;

/// Errors surfaced to callers.
///
/// Missing concepts and degenerate arithmetic are never errors; they resolve to
/// `None` or a documented sentinel. Only caller misuse and unreadable input end
/// up here.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
