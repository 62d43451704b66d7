//! Error types for sheetsense.

use thiserror::Error;

/// Result type for inspection operations.
pub type InspectResult<T> = Result<T, InspectError>;

/// Errors that can occur while inspecting a workbook.
///
/// Classification itself never fails; every variant here originates in the
/// row source or in loading configuration.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The row source could not enumerate a sheet's rows.
    #[error("Failed to read rows of sheet '{sheet}': {message}")]
    Source { sheet: String, message: String },

    /// The row source could not list the workbook's sheets.
    #[error("Failed to list sheets: {0}")]
    SheetList(String),

    /// The requested sheet does not exist.
    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    /// Invalid classifier or inspector configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InspectError {
    /// Create a row source error for a sheet.
    pub fn row_source(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            sheet: sheet.into(),
            message: message.into(),
        }
    }

    /// Create a sheet-not-found error.
    pub fn sheet_not_found(name: impl Into<String>) -> Self {
        Self::SheetNotFound { name: name.into() }
    }
}
