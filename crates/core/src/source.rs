//! Row sources: the collaborator that turns a workbook into rows of text.

use crate::error::{InspectError, InspectResult};
use indexmap::IndexMap;

/// Enumerates a workbook's sheets and their rows as cell text.
///
/// Empty cells are empty strings. Rows are returned in sheet order starting
/// at the sheet's first row.
pub trait RowSource {
    /// Names of the visible sheets, in workbook order.
    fn sheet_names(&mut self) -> InspectResult<Vec<String>>;

    /// At most `limit` rows of `sheet`.
    fn read_rows(&mut self, sheet: &str, limit: usize) -> InspectResult<Vec<Vec<String>>>;

    /// Like [`read_rows`](Self::read_rows), calling `on_row` with the 1-based
    /// number of each row as it is produced.
    ///
    /// The provided implementation reads everything first and reports the
    /// last row only; sources that produce rows one at a time override it.
    fn read_rows_tracked(
        &mut self,
        sheet: &str,
        limit: usize,
        on_row: &mut dyn FnMut(usize),
    ) -> InspectResult<Vec<Vec<String>>> {
        let rows = self.read_rows(sheet, limit)?;
        if !rows.is_empty() {
            on_row(rows.len());
        }
        Ok(rows)
    }
}

#[derive(Debug, Clone, Default)]
struct MemorySheet {
    rows: Vec<Vec<String>>,
    hidden: bool,
}

/// In-memory workbook (preserves insertion order)
///
/// ```
/// use sheetsense_core::{MemorySource, RowSource};
///
/// let mut source = MemorySource::new()
///     .with_sheet("Stock", vec![vec!["MERK", "TYPE"]])
///     .with_hidden_sheet("Lookup", vec![vec!["x"]]);
/// assert_eq!(source.sheet_names().unwrap(), vec!["Stock"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: IndexMap<String, MemorySheet>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert<S: AsRef<str>>(&mut self, name: &str, rows: Vec<Vec<S>>, hidden: bool) {
        let rows = rows
            .into_iter()
            .map(|row| row.iter().map(|c| c.as_ref().to_string()).collect())
            .collect();
        self.sheets
            .insert(name.to_string(), MemorySheet { rows, hidden });
    }

    /// Add (or replace) a visible sheet
    pub fn add_sheet<S: AsRef<str>>(&mut self, name: &str, rows: Vec<Vec<S>>) {
        self.insert(name, rows, false);
    }

    /// Add a visible sheet
    #[must_use]
    pub fn with_sheet<S: AsRef<str>>(mut self, name: &str, rows: Vec<Vec<S>>) -> Self {
        self.insert(name, rows, false);
        self
    }

    /// Add a hidden sheet; it is not listed by `sheet_names`
    #[must_use]
    pub fn with_hidden_sheet<S: AsRef<str>>(mut self, name: &str, rows: Vec<Vec<S>>) -> Self {
        self.insert(name, rows, true);
        self
    }
}

impl RowSource for MemorySource {
    fn sheet_names(&mut self) -> InspectResult<Vec<String>> {
        Ok(self
            .sheets
            .iter()
            .filter(|(_, sheet)| !sheet.hidden)
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn read_rows(&mut self, sheet: &str, limit: usize) -> InspectResult<Vec<Vec<String>>> {
        self.read_rows_tracked(sheet, limit, &mut |_| {})
    }

    fn read_rows_tracked(
        &mut self,
        sheet: &str,
        limit: usize,
        on_row: &mut dyn FnMut(usize),
    ) -> InspectResult<Vec<Vec<String>>> {
        let data = self
            .sheets
            .get(sheet)
            .ok_or_else(|| InspectError::sheet_not_found(sheet))?;
        let mut rows = Vec::with_capacity(data.rows.len().min(limit));
        for row in data.rows.iter().take(limit) {
            rows.push(row.clone());
            on_row(rows.len());
        }
        Ok(rows)
    }
}
