//! Row normalization and the bounded per-sheet row window.

/// Hard cap on the number of rows inspected per sheet.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Return `row` without its suffix of blank cells.
///
/// A cell is blank when it is empty after whitespace trimming. Interior blank
/// cells are preserved. A fully blank row yields an empty slice.
pub fn trim_trailing_empty<S: AsRef<str>>(row: &[S]) -> &[S] {
    let end = row
        .iter()
        .rposition(|cell| !cell.as_ref().trim().is_empty())
        .map_or(0, |last| last + 1);
    &row[..end]
}

/// Check whether every cell of `row` is blank.
pub fn is_empty_row<S: AsRef<str>>(row: &[S]) -> bool {
    row.iter().all(|cell| cell.as_ref().trim().is_empty())
}

/// Upper-cased, trimmed, non-empty cell texts of `row`, in column order.
pub fn normalize_row<S: AsRef<str>>(row: &[S]) -> Vec<String> {
    row.iter()
        .map(|cell| cell.as_ref().trim().to_uppercase())
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// The bounded, ordered rows of one sheet.
///
/// Cells are stored whitespace-trimmed. Rows are addressed either by 0-based
/// index through [`SheetRows::as_slice`] or by 1-based row number through
/// [`SheetRows::row`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRows {
    rows: Vec<Vec<String>>,
}

impl SheetRows {
    /// Create an empty row window
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect at most `cap` rows, trimming every cell.
    pub fn from_rows<I, R, S>(rows: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .take(cap)
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.as_ref().trim().to_string())
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Build a window from literal data with the default cap
    ///
    /// ```
    /// use sheetsense_core::SheetRows;
    ///
    /// let rows = SheetRows::from_data(vec![vec!["MERK", "TYPE"], vec!["Toyota", "Avanza"]]);
    /// assert_eq!(rows.len(), 2);
    /// assert_eq!(rows.row(2).unwrap()[0], "Toyota");
    /// ```
    pub fn from_data<S: AsRef<str>>(data: Vec<Vec<S>>) -> Self {
        Self::from_rows(data, DEFAULT_MAX_ROWS)
    }

    /// Number of rows in the window
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the window holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, 0-based
    #[must_use]
    pub fn as_slice(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Row by 1-based row number
    #[must_use]
    pub fn row(&self, number: usize) -> Option<&[String]> {
        number
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .map(Vec::as_slice)
    }

    /// Widest row, counting trailing blank cells
    #[must_use]
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 1-based number of the first row with any non-blank cell.
    #[must_use]
    pub fn first_non_empty_row(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| !is_empty_row(row))
            .map(|idx| idx + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_empty_keeps_interior_blanks() {
        let row = vec!["A", "", "C", " ", ""];
        assert_eq!(trim_trailing_empty(&row), &["A", "", "C"]);
    }

    #[test]
    fn test_trim_trailing_empty_all_blank() {
        let row = vec!["", "", ""];
        assert!(trim_trailing_empty(&row).is_empty());
        assert!(is_empty_row(&row));
    }

    #[test]
    fn test_trim_is_prefix_without_trailing_blank() {
        let rows: Vec<Vec<&str>> = vec![
            vec![],
            vec!["x"],
            vec!["", "x", "  "],
            vec!["x", "", "y", "", " \t"],
        ];
        for row in &rows {
            let trimmed = trim_trailing_empty(row);
            assert!(row.starts_with(trimmed));
            if let Some(last) = trimmed.last() {
                assert!(!last.trim().is_empty());
            } else {
                assert!(is_empty_row(row));
            }
        }
    }

    #[test]
    fn test_normalize_row() {
        let row = vec![" merk ", "", "Type", "  "];
        assert_eq!(normalize_row(&row), vec!["MERK", "TYPE"]);
    }

    #[test]
    fn test_sheet_rows_cap() {
        let data: Vec<Vec<String>> = (0..1200).map(|i| vec![i.to_string()]).collect();
        let rows = SheetRows::from_rows(data, DEFAULT_MAX_ROWS);
        assert_eq!(rows.len(), 1000);
        assert_eq!(rows.row(1000).unwrap()[0], "999");
        assert!(rows.row(1001).is_none());
        assert!(rows.row(0).is_none());
    }

    #[test]
    fn test_sheet_rows_trims_cells() {
        let rows = SheetRows::from_data(vec![vec![" a ", "b  "], vec![], vec!["", "c", ""]]);
        assert_eq!(rows.row(1).unwrap(), &["a", "b"]);
        assert_eq!(rows.max_columns(), 3);
        assert_eq!(rows.first_non_empty_row(), Some(1));
    }

    #[test]
    fn test_first_non_empty_row_skips_blank_rows() {
        let rows = SheetRows::from_data(vec![vec!["", ""], vec![], vec!["x"]]);
        assert_eq!(rows.first_non_empty_row(), Some(3));
        assert_eq!(SheetRows::new().first_non_empty_row(), None);
    }
}
