//! # sheetsense-core
//!
//! Logical structure inference for spreadsheet sheets.
//!
//! This crate provides:
//! - Row normalization over a bounded window of rows
//! - Header row classification (strict report layout and generic vocabulary)
//! - Section extraction and merging of repeated report blocks
//! - Column typing and sampling
//! - Best-effort progress reporting
//! - The [`Inspector`] that drives all of the above over a [`RowSource`]

/// Header row strategies and classifier configuration.
pub mod classify;
/// Column descriptors, typing and sampling.
pub mod column;
/// Error types and result aliases.
pub mod error;
/// Workbook inspection.
pub mod inspect;
/// Folding of repeated report sections.
pub mod merge;
/// Progress notification.
pub mod progress;
/// Row normalization.
pub mod row;
/// Section extraction.
pub mod section;
/// Row sources.
pub mod source;

pub use classify::{
    find_report_header_rows, is_likely_header_row, Boundary, Classifier, ClassifierConfig,
    HeaderStrategy, HeaderVocabulary, RankedStrategy, ReportHeaderMatcher, ReportMatcherConfig,
};
pub use column::{
    build_columns_from_section, collect_full_values, column_letter, is_section_marker_row,
    merge_sample_strings, ColumnInfo, DataType, DEFAULT_MAX_SAMPLES,
};
pub use error::{InspectError, InspectResult};
pub use inspect::{FileInfo, InspectOptions, Inspector, SheetDetail, SheetInfo};
pub use merge::{merge_column_samples, merge_report_sections, merge_sections_with, HandoverKey, MergeKey};
pub use progress::{Progress, ProgressCallback, ProgressInfo, ROW_PROGRESS_INTERVAL};
pub use row::{is_empty_row, normalize_row, trim_trailing_empty, SheetRows, DEFAULT_MAX_ROWS};
pub use section::{
    extract_sections, extract_sections_by_header_indexes, extract_sections_by_heuristic,
    extract_sections_with, section_title_from_row, Section,
};
pub use source::{MemorySource, RowSource};
