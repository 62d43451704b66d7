//! Column descriptors, shallow type inference and value sampling.

use crate::classify::HeaderVocabulary;
use crate::row::{is_empty_row, trim_trailing_empty, SheetRows};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of sample values kept per column.
pub const DEFAULT_MAX_SAMPLES: usize = 5;

/// Substrings marking report boundary rows (case-insensitive).
pub const SECTION_MARKERS: &[&str] = &[
    "CROSS SELLING",
    "NON CROSS SELLING",
    "LAST UPDATE",
    "HANDOVER",
];

/// Inferred scalar type of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Empty,
    Number,
    String,
}

impl DataType {
    /// Classify a single cell text.
    ///
    /// A value is a number when every character is an ASCII digit or one of
    /// `.`, `-`, `+`, `e`, `E`. No numeric parse is attempted, so `"1-2"` is
    /// a number and `"1,000"` is a string.
    pub fn infer(value: &str) -> Self {
        if value.is_empty() {
            return DataType::Empty;
        }
        let numeric = value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
        if numeric {
            DataType::Number
        } else {
            DataType::String
        }
    }

    /// Lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Empty => "empty",
            DataType::Number => "number",
            DataType::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a section or sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Column letter plus header row number, e.g. `C2`
    pub start_position: String,
    pub sample_values: Vec<String>,
    /// Decided by the first sample seen
    pub data_type: DataType,
}

impl ColumnInfo {
    fn new(name: &str, col_idx: usize, header_row: usize, max_samples: usize) -> Self {
        Self {
            name: name.to_string(),
            start_position: format!("{}{}", column_letter(col_idx), header_row),
            sample_values: Vec::with_capacity(max_samples),
            data_type: DataType::Empty,
        }
    }

    /// Append a distinct sample while below `max_samples`; the first sample
    /// fixes the type.
    fn push_sample(&mut self, value: &str, max_samples: usize) {
        if self.sample_values.len() >= max_samples
            || self.sample_values.iter().any(|seen| seen == value)
        {
            return;
        }
        if self.sample_values.is_empty() {
            self.data_type = DataType::infer(value);
        }
        self.sample_values.push(value.to_string());
    }
}

/// Spreadsheet column letters for a 0-based index (`0` → `A`, `26` → `AA`).
pub fn column_letter(col_idx: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col_idx + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Build one column per header from the data rows below `header_row`.
///
/// Rows `header_row + 1 ..= stop_at_row` (1-based) are scanned; `stop_at_row`
/// of zero or beyond the window means "to the end of the window". Each column
/// keeps up to `max_samples` distinct non-empty values in first-seen order.
pub fn build_columns_from_section<S: AsRef<str>>(
    rows: &SheetRows,
    header_row: usize,
    headers: &[S],
    max_samples: usize,
    stop_at_row: usize,
) -> Vec<ColumnInfo> {
    let mut columns: Vec<ColumnInfo> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| ColumnInfo::new(header.as_ref(), idx, header_row, max_samples))
        .collect();

    let stop = if stop_at_row == 0 || stop_at_row > rows.len() {
        rows.len()
    } else {
        stop_at_row
    };
    for row_num in header_row + 1..=stop {
        let Some(row) = rows.row(row_num) else {
            continue;
        };
        for (column, cell) in columns.iter_mut().zip(row) {
            let value = cell.trim();
            if !value.is_empty() {
                column.push_sample(value, max_samples);
            }
        }
    }
    columns
}

/// Check whether a row is report boundary text rather than data.
pub fn is_section_marker_row<S: AsRef<str>>(row: &[S]) -> bool {
    let joined = row
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    SECTION_MARKERS.iter().any(|marker| joined.contains(marker))
}

/// Full-value pass over the whole window.
///
/// Returns, for each requested 0-based column index, every non-empty value of
/// the rows that are neither blank, header-like nor section markers. Columns
/// without any value map to an empty list.
pub fn collect_full_values(
    rows: &SheetRows,
    columns: &[usize],
    vocabulary: &HeaderVocabulary,
) -> IndexMap<usize, Vec<String>> {
    let mut values: IndexMap<usize, Vec<String>> =
        columns.iter().map(|&idx| (idx, Vec::new())).collect();
    for row in rows.as_slice() {
        let row = trim_trailing_empty(row);
        if is_empty_row(row) || vocabulary.is_likely_header_row(row) || is_section_marker_row(row)
        {
            continue;
        }
        for (&idx, collected) in &mut values {
            if let Some(cell) = row.get(idx) {
                let value = cell.trim();
                if !value.is_empty() {
                    collected.push(value.to_string());
                }
            }
        }
    }
    values
}

/// Merge `incoming` into `base`, skipping exact duplicates, up to `max_samples`.
pub fn merge_sample_strings(base: &mut Vec<String>, incoming: &[String], max_samples: usize) {
    for sample in incoming {
        if base.len() >= max_samples {
            break;
        }
        if !base.contains(sample) {
            base.push(sample.clone());
        }
    }
}
