//! Workbook inspection: drives a [`RowSource`] sheet by sheet and assembles
//! the inferred structure.

use crate::classify::{Classifier, ClassifierConfig, HeaderVocabulary};
use crate::column::{build_columns_from_section, collect_full_values, ColumnInfo, DEFAULT_MAX_SAMPLES};
use crate::error::InspectResult;
use crate::progress::Progress;
use crate::row::{trim_trailing_empty, SheetRows, DEFAULT_MAX_ROWS};
use crate::section::{extract_sections_with, Section};
use crate::source::RowSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cheap per-sheet summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,
    /// Rows seen, at most the row cap
    pub row_count: usize,
    /// Cells in the first row
    pub column_count: usize,
}

/// Inferred structure of one sheet.
///
/// `headers` and `columns` mirror the first section when there is one;
/// otherwise they come from the first non-empty row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDetail {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub headers: Vec<String>,
    pub columns: Vec<ColumnInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

/// Inspection result for a whole workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub sheets: Vec<SheetInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheet_details: Vec<SheetDetail>,
}

/// Options for inspecting a workbook
#[derive(Debug)]
pub struct InspectOptions {
    /// Rows read per sheet, never more than [`DEFAULT_MAX_ROWS`]
    pub max_rows: usize,
    /// Sample values kept per column
    pub max_samples: usize,
    pub classifier: Classifier,
    /// Vocabulary used to skip header-like rows in the full-value pass
    pub vocabulary: HeaderVocabulary,
    pub progress: Progress,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            max_samples: DEFAULT_MAX_SAMPLES,
            classifier: Classifier::default(),
            vocabulary: HeaderVocabulary::default(),
            progress: Progress::default(),
        }
    }
}

impl InspectOptions {
    /// Set the rows read per sheet. Values above [`DEFAULT_MAX_ROWS`] are clamped.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        if max_rows > DEFAULT_MAX_ROWS {
            warn!(max_rows, cap = DEFAULT_MAX_ROWS, "max_rows above the row cap, clamped");
        }
        self.max_rows = max_rows.min(DEFAULT_MAX_ROWS);
        self
    }

    /// Set the sample values kept per column.
    #[must_use]
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Replace the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace classifier and full-value vocabulary from configuration.
    pub fn with_classifier_config(mut self, config: &ClassifierConfig) -> InspectResult<Self> {
        self.classifier = Classifier::from_config(config)?;
        self.vocabulary = HeaderVocabulary::new(&config.header_tokens)
            .with_thresholds(config.min_non_empty, config.min_known);
        Ok(self)
    }

    /// Attach a progress reporter.
    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }
}

/// Infers sheet structure from a row source.
///
/// ```
/// use sheetsense_core::{Inspector, MemorySource};
///
/// let source = MemorySource::new().with_sheet("Stock", vec![
///     vec!["MERK", "TYPE", "YEAR"],
///     vec!["Toyota", "Avanza", "2020"],
/// ]);
/// let mut inspector = Inspector::new(source);
/// let detail = inspector.inspect_sheet_detail("Stock").unwrap();
/// assert_eq!(detail.sections.len(), 1);
/// assert_eq!(detail.headers, vec!["MERK", "TYPE", "YEAR"]);
/// ```
#[derive(Debug)]
pub struct Inspector<S: RowSource> {
    source: S,
    options: InspectOptions,
}

impl<S: RowSource> Inspector<S> {
    /// Inspector with default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, InspectOptions::default())
    }

    /// Inspector with explicit options.
    pub fn with_options(source: S, options: InspectOptions) -> Self {
        Self { source, options }
    }

    /// Options in use.
    pub fn options(&self) -> &InspectOptions {
        &self.options
    }

    /// Progress reporter from the options.
    pub fn progress(&self) -> &Progress {
        &self.options.progress
    }

    /// Give back the row source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Rows read per sheet: the configured `max_rows`, at most [`DEFAULT_MAX_ROWS`].
    pub fn row_limit(&self) -> usize {
        self.options.max_rows.min(DEFAULT_MAX_ROWS)
    }

    /// Rows `1..=max_row` of a sheet, never more than the row limit.
    pub fn sheet_rows(&mut self, sheet: &str, max_row: usize) -> InspectResult<SheetRows> {
        self.read_window(sheet, max_row, None)
    }

    /// [`sheet_rows`](Self::sheet_rows), reporting `phase` row progress while
    /// the rows are read.
    pub fn sheet_rows_tracked(
        &mut self,
        sheet: &str,
        max_row: usize,
        phase: &str,
    ) -> InspectResult<SheetRows> {
        self.read_window(sheet, max_row, Some(phase))
    }

    fn read_window(
        &mut self,
        sheet: &str,
        max_row: usize,
        phase: Option<&str>,
    ) -> InspectResult<SheetRows> {
        let cap = max_row.min(self.row_limit());
        let progress = &self.options.progress;
        let raw = match phase {
            Some(phase) => self.source.read_rows_tracked(sheet, cap, &mut |row| {
                progress.emit_rows(phase, sheet, row, cap);
            })?,
            None => self.source.read_rows(sheet, cap)?,
        };
        Ok(SheetRows::from_rows(raw, cap))
    }

    /// Summary of every visible sheet.
    pub fn inspect(&mut self) -> InspectResult<FileInfo> {
        let names = self.source.sheet_names()?;
        let total = names.len();
        let mut info = FileInfo {
            sheets: Vec::with_capacity(total),
            sheet_details: Vec::new(),
        };
        self.progress().emit("inspect_sheets", "", 0, total);
        for (idx, name) in names.iter().enumerate() {
            let rows = self.scan_rows(name, None)?;
            info.sheets.push(sheet_info(name, &rows));
            self.progress().emit("inspect_sheets", name, idx + 1, total);
        }
        Ok(info)
    }

    /// Summary plus inferred structure of every visible sheet.
    pub fn inspect_with_details(&mut self) -> InspectResult<FileInfo> {
        let names = self.source.sheet_names()?;
        let total = names.len();
        let mut info = FileInfo {
            sheets: Vec::with_capacity(total),
            sheet_details: Vec::with_capacity(total),
        };
        self.progress().emit("inspect_details", "", 0, total);
        for (idx, name) in names.iter().enumerate() {
            let rows = self.scan_rows(name, Some("scan_sheet_rows"))?;
            info.sheets.push(sheet_info(name, &rows));
            info.sheet_details.push(self.detail_from_rows(name, &rows));
            self.progress().emit("inspect_details", name, idx + 1, total);
        }
        Ok(info)
    }

    /// Inferred structure of one sheet.
    pub fn inspect_sheet_detail(&mut self, sheet: &str) -> InspectResult<SheetDetail> {
        let rows = self.scan_rows(sheet, Some("scan_sheet_rows"))?;
        Ok(self.detail_from_rows(sheet, &rows))
    }

    /// Full-value pass for the given 0-based columns of a sheet.
    pub fn full_column_values(
        &mut self,
        sheet: &str,
        columns: &[usize],
    ) -> InspectResult<IndexMap<usize, Vec<String>>> {
        let limit = self.row_limit();
        let rows = self.sheet_rows_tracked(sheet, limit, "toon_full_values_rows")?;
        Ok(collect_full_values(&rows, columns, &self.options.vocabulary))
    }

    /// The inspection window of a sheet; warns when the sheet fills it.
    fn scan_rows(&mut self, sheet: &str, phase: Option<&str>) -> InspectResult<SheetRows> {
        let limit = self.row_limit();
        let rows = self.read_window(sheet, limit, phase)?;
        if limit > 0 && rows.len() >= limit {
            warn!(sheet, limit, "sheet fills the row window, later rows are not inspected");
        }
        Ok(rows)
    }

    fn detail_from_rows(&self, name: &str, rows: &SheetRows) -> SheetDetail {
        let max_samples = self.options.max_samples;
        let sections = extract_sections_with(rows, &self.options.classifier, max_samples);
        let mut detail = SheetDetail {
            name: name.to_string(),
            row_count: rows.len(),
            column_count: rows.max_columns(),
            ..SheetDetail::default()
        };

        if let Some(first) = sections.first() {
            detail.column_count = first.column_count;
            detail.headers = first.headers.clone();
            detail.columns = first.columns.clone();
            detail.sections = sections;
            debug!(
                sheet = name,
                rows = detail.row_count,
                sections = detail.sections.len(),
                "sheet inspected"
            );
            return detail;
        }

        // single plain table: first non-empty row holds the headers
        let Some(header_row) = rows.first_non_empty_row() else {
            debug!(sheet = name, "sheet is empty");
            return detail;
        };
        let headers = rows
            .row(header_row)
            .map(|row| trim_trailing_empty(row).to_vec())
            .unwrap_or_default();
        detail.column_count = headers.len();
        detail.columns =
            build_columns_from_section(rows, header_row, &headers, max_samples, rows.len());
        detail.headers = headers;
        debug!(sheet = name, header_row, "no sections, using first non-empty row");
        detail
    }
}

fn sheet_info(name: &str, rows: &SheetRows) -> SheetInfo {
    SheetInfo {
        name: name.to_string(),
        row_count: rows.len(),
        column_count: rows.as_slice().first().map_or(0, Vec::len),
    }
}
