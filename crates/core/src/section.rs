//! Partitioning a sheet into sections (logical sub-tables).
//!
//! Extraction is one state machine over row index with two states,
//! `Scanning` and `InSection`. A header row opens a section; the section is
//! closed according to the [`Boundary`] of the strategy that found the
//! header rows.

use crate::classify::{Boundary, Classifier, HeaderStrategy, HeaderVocabulary};
use crate::column::{build_columns_from_section, ColumnInfo, DEFAULT_MAX_SAMPLES};
use crate::merge::merge_report_sections;
use crate::row::{is_empty_row, trim_trailing_empty, SheetRows};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cell substrings that anchor a section title, checked in order.
const TITLE_MARKERS: &[&str] = &["CROSS SELLING", "NON CROSS SELLING"];

/// A logical sub-table within one sheet.
///
/// Row numbers are 1-based. `start_row` is always `header_row + 1`; an empty
/// section has `end_row == header_row`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub header_row: usize,
    pub start_row: usize,
    pub end_row: usize,
    pub headers: Vec<String>,
    pub columns: Vec<ColumnInfo>,
    pub row_count: usize,
    pub column_count: usize,
}

impl Section {
    /// Build a section from its 0-based header index and exclusive 0-based end.
    fn from_rows(rows: &SheetRows, header_idx: usize, end: usize, max_samples: usize) -> Self {
        let rows_slice = rows.as_slice();
        let headers = trim_trailing_empty(&rows_slice[header_idx]).to_vec();
        let title = header_idx
            .checked_sub(1)
            .map(|prev| section_title_from_row(&rows_slice[prev]))
            .unwrap_or_default();
        let header_row = header_idx + 1;
        // exclusive 0-based end is the inclusive 1-based end row
        let end_row = end;
        let columns = build_columns_from_section(rows, header_row, &headers, max_samples, end_row);
        Section {
            title,
            header_row,
            start_row: header_row + 1,
            end_row,
            column_count: headers.len(),
            headers,
            columns,
            row_count: end_row.saturating_sub(header_row),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Scanning,
    InSection { header_idx: usize },
}

fn blank_run_at(rows: &[Vec<String>], idx: usize, needed: usize) -> bool {
    rows[idx..]
        .iter()
        .take(needed)
        .take_while(|row| is_empty_row(row))
        .count()
        >= needed
}

/// Run the extraction state machine over `rows`.
///
/// `header_idx` holds the 0-based header rows, sorted ascending.
fn extract_by_boundary(
    rows: &SheetRows,
    header_idx: &[usize],
    boundary: Boundary,
    max_samples: usize,
) -> Vec<Section> {
    let all = rows.as_slice();
    let n = all.len();
    let is_header = |idx: usize| header_idx.binary_search(&idx).is_ok();

    let mut sections = Vec::new();
    let mut state = ScanState::Scanning;
    let mut idx = 0;
    loop {
        match state {
            ScanState::Scanning => {
                if idx >= n {
                    break;
                }
                if is_header(idx) {
                    state = ScanState::InSection { header_idx: idx };
                }
                idx += 1;
            }
            ScanState::InSection { header_idx } => {
                let closes = idx >= n
                    || is_header(idx)
                    || matches!(boundary, Boundary::BlankRun(k) if blank_run_at(all, idx, k));
                if !closes {
                    idx += 1;
                    continue;
                }
                let mut end = idx.min(n);
                if boundary == Boundary::TrimTrailingBlanks {
                    while end > header_idx + 1 && is_empty_row(&all[end - 1]) {
                        end -= 1;
                    }
                }
                sections.push(Section::from_rows(rows, header_idx, end, max_samples));
                // the closing row is examined again while scanning
                state = ScanState::Scanning;
            }
        }
    }
    sections
}

/// Derive a section title from the row above its header.
///
/// When a cell mentions a cross-selling marker the title is that cell plus
/// up to two preceding non-empty cells; otherwise it is the first one or two
/// non-empty cells.
pub fn section_title_from_row<S: AsRef<str>>(row: &[S]) -> String {
    let tokens: Vec<&str> = row
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .collect();
    if tokens.is_empty() {
        return String::new();
    }
    let upper: Vec<String> = tokens.iter().map(|t| t.to_uppercase()).collect();
    for marker in TITLE_MARKERS {
        if let Some(pos) = upper.iter().position(|t| t.contains(marker)) {
            return tokens[pos.saturating_sub(2)..=pos].join(" ");
        }
    }
    tokens[..tokens.len().min(2)].join(" ")
}

/// Sections from fixed header row indexes (0-based).
///
/// Each section runs to the row before the next header (or the end of the
/// window) with trailing blank rows dropped.
pub fn extract_sections_by_header_indexes(rows: &SheetRows, header_idx: &[usize]) -> Vec<Section> {
    let mut sorted: Vec<usize> = header_idx
        .iter()
        .copied()
        .filter(|&idx| idx < rows.len())
        .collect();
    sorted.sort_unstable();
    sorted.dedup();
    extract_by_boundary(rows, &sorted, Boundary::TrimTrailingBlanks, DEFAULT_MAX_SAMPLES)
}

/// Sections found by the generic header heuristic.
///
/// A section closes at the next header row, before two consecutive blank
/// rows, or at the end of the window.
pub fn extract_sections_by_heuristic(rows: &SheetRows) -> Vec<Section> {
    let vocabulary = HeaderVocabulary::default();
    let header_idx = vocabulary.header_rows(rows.as_slice());
    extract_by_boundary(rows, &header_idx, Boundary::BlankRun(2), DEFAULT_MAX_SAMPLES)
}

/// Sections of a sheet using the default classifier.
///
/// ```
/// use sheetsense_core::{extract_sections, SheetRows};
///
/// let rows = SheetRows::from_data(vec![
///     vec!["MERK", "TYPE", "YEAR"],
///     vec!["Toyota", "Avanza", "2020"],
/// ]);
/// let sections = extract_sections(&rows);
/// assert_eq!(sections.len(), 1);
/// assert_eq!(sections[0].end_row, 2);
/// ```
pub fn extract_sections(rows: &SheetRows) -> Vec<Section> {
    extract_sections_with(rows, &Classifier::default(), DEFAULT_MAX_SAMPLES)
}

/// Sections of a sheet using the first strategy of `classifier` that
/// recognises any header row. Empty when none does.
pub fn extract_sections_with(
    rows: &SheetRows,
    classifier: &Classifier,
    max_samples: usize,
) -> Vec<Section> {
    let Some((ranked, header_idx)) = classifier.select(rows.as_slice()) else {
        debug!(rows = rows.len(), "no header strategy matched");
        return Vec::new();
    };
    debug!(
        strategy = ranked.strategy.name(),
        headers = header_idx.len(),
        "header strategy selected"
    );
    let sections = extract_by_boundary(rows, &header_idx, ranked.boundary, max_samples);
    if ranked.merge {
        merge_report_sections(sections)
    } else {
        sections
    }
}
