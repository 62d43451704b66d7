//! # sheetsense-sheet
//!
//! `.xlsx` workbooks as a [`sheetsense_core::RowSource`].

mod error;
mod xlsx;

pub use error::{Result, SheetError};
pub use xlsx::{data_to_text, XlsxSource};
