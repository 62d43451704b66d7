use sheetsense_core::InspectError;
use thiserror::Error;

/// Errors that can occur while reading a workbook
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Failed to open workbook {path}: {message}")]
    Open { path: String, message: String },

    #[error("Failed to read sheet '{sheet}': {message}")]
    Read { sheet: String, message: String },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;

impl From<SheetError> for InspectError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::SheetNotFound { name } => InspectError::SheetNotFound { name },
            SheetError::Read { sheet, message } => InspectError::Source { sheet, message },
            SheetError::Io(e) => InspectError::Io(e),
            other @ SheetError::Open { .. } => InspectError::SheetList(other.to_string()),
        }
    }
}
