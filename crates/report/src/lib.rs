//! # sheetsense-report
//!
//! Renderings of a [`sheetsense_core::FileInfo`]:
//! - a Markdown report, optionally with per-section row tables
//! - a compact TOON payload with sampled or full column values
//! - pretty JSON

mod error;
pub mod markdown;
pub mod toon;

pub use error::{ReportError, Result};
pub use markdown::{escape_cell, render_markdown};
pub use toon::{summary_to_toon, CompactColumn, CompactPayload, CompactSection, CompactSheet};

use sheetsense_core::FileInfo;

/// Pretty-printed JSON of an inspection result.
pub fn render_json(info: &FileInfo) -> Result<String> {
    Ok(serde_json::to_string_pretty(info)?)
}
