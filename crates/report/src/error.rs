use sheetsense_core::InspectError;
use thiserror::Error;

/// Errors raised while rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Inspection failed: {0}")]
    Inspect(#[from] InspectError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
