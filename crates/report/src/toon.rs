//! Compact TOON (Token-Oriented Object Notation) payloads.
//!
//! The payload holds three tabular arrays:
//!
//! ```text
//! sheet_details[1]{name,row_count,column_count,header_count,section_count}:
//!   Stock,4,3,3,1
//! sections[1]{sheet,section_idx,title,header_row,start_row,end_row,row_count,column_count}:
//!   Stock,1,,1,2,4,3,3
//! columns[3]{sheet,column_idx,name,start_position,data_type,samples}:
//!   Stock,1,MERK,A1,string,Toyota|Honda
//!   ...
//! ```
//!
//! Columns are keyed by sheet, position and name, so a column repeated by
//! several sections of a sheet appears once with its samples merged.

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sheetsense_core::{
    merge_sample_strings, ColumnInfo, DataType, FileInfo, Inspector, RowSource,
    DEFAULT_MAX_SAMPLES,
};
use std::io::Write;
use tracing::debug;

/// Separator between values in the `samples` field
const SAMPLE_SEPARATOR: &str = "|";

/// One row of the `sheet_details` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactSheet {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub header_count: usize,
    pub section_count: usize,
}

/// One row of the `sections` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactSection {
    pub sheet: String,
    /// 1-based position within the sheet
    pub section_idx: usize,
    pub title: String,
    pub header_row: usize,
    pub start_row: usize,
    pub end_row: usize,
    pub row_count: usize,
    pub column_count: usize,
}

/// One row of the `columns` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactColumn {
    pub sheet: String,
    /// 1-based column position
    pub column_idx: usize,
    pub name: String,
    pub start_position: String,
    pub data_type: DataType,
    pub samples: Vec<String>,
}

/// Compact inspection payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactPayload {
    pub sheet_details: Vec<CompactSheet>,
    pub sections: Vec<CompactSection>,
    pub columns: Vec<CompactColumn>,
}

impl CompactPayload {
    /// Build the payload from sampled column values.
    pub fn sample(info: &FileInfo) -> Self {
        let mut payload = Self::default();
        let mut column_index: IndexMap<(String, usize, String), usize> = IndexMap::new();

        for detail in &info.sheet_details {
            payload.sheet_details.push(CompactSheet {
                name: detail.name.clone(),
                row_count: detail.row_count,
                column_count: detail.column_count,
                header_count: detail.headers.len(),
                section_count: detail.sections.len(),
            });

            if detail.sections.is_empty() {
                payload.add_columns(&mut column_index, &detail.name, &detail.columns);
                continue;
            }
            for (idx, section) in detail.sections.iter().enumerate() {
                payload.sections.push(CompactSection {
                    sheet: detail.name.clone(),
                    section_idx: idx + 1,
                    title: section.title.clone(),
                    header_row: section.header_row,
                    start_row: section.start_row,
                    end_row: section.end_row,
                    row_count: section.row_count,
                    column_count: section.column_count,
                });
                payload.add_columns(&mut column_index, &detail.name, &section.columns);
            }
        }
        payload
    }

    fn add_columns(
        &mut self,
        index: &mut IndexMap<(String, usize, String), usize>,
        sheet: &str,
        columns: &[ColumnInfo],
    ) {
        for (idx, column) in columns.iter().enumerate() {
            let key = (sheet.to_string(), idx + 1, column.name.clone());
            if let Some(&pos) = index.get(&key) {
                let existing = &mut self.columns[pos];
                merge_sample_strings(
                    &mut existing.samples,
                    &column.sample_values,
                    DEFAULT_MAX_SAMPLES,
                );
                if existing.data_type == DataType::Empty && column.data_type != DataType::Empty {
                    existing.data_type = column.data_type;
                }
                continue;
            }
            index.insert(key, self.columns.len());
            self.columns.push(CompactColumn {
                sheet: sheet.to_string(),
                column_idx: idx + 1,
                name: column.name.clone(),
                start_position: column.start_position.clone(),
                data_type: column.data_type,
                samples: column.sample_values.clone(),
            });
        }
    }

    /// Replace every column's samples with the full-value pass of its sheet.
    pub fn fill_full_values<S: RowSource>(&mut self, inspector: &mut Inspector<S>) -> Result<()> {
        let mut by_sheet: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (pos, column) in self.columns.iter().enumerate() {
            if column.column_idx == 0 {
                continue;
            }
            by_sheet.entry(column.sheet.clone()).or_default().push(pos);
        }

        let total = by_sheet.len();
        inspector.progress().emit("toon_full_values", "", 0, total);
        for (done, (sheet, positions)) in by_sheet.iter().enumerate() {
            let mut wanted: Vec<usize> = positions
                .iter()
                .map(|&pos| self.columns[pos].column_idx - 1)
                .collect();
            wanted.sort_unstable();
            wanted.dedup();

            let values = inspector.full_column_values(sheet, &wanted)?;
            for &pos in positions {
                let column = &mut self.columns[pos];
                column.samples = values
                    .get(&(column.column_idx - 1))
                    .cloned()
                    .unwrap_or_default();
            }
            debug!(sheet = %sheet, columns = wanted.len(), "collected full column values");
            inspector.progress().emit("toon_full_values", sheet, done + 1, total);
        }
        Ok(())
    }

    /// Build the payload with full column values.
    pub fn full<S: RowSource>(info: &FileInfo, inspector: &mut Inspector<S>) -> Result<Self> {
        let mut payload = Self::sample(info);
        payload.fill_full_values(inspector)?;
        Ok(payload)
    }

    /// Write the payload as TOON
    pub fn write_toon<W: Write>(&self, mut writer: W) -> Result<()> {
        let sheets: Vec<Vec<String>> = self
            .sheet_details
            .iter()
            .map(|s| {
                vec![
                    s.name.clone(),
                    s.row_count.to_string(),
                    s.column_count.to_string(),
                    s.header_count.to_string(),
                    s.section_count.to_string(),
                ]
            })
            .collect();
        write_table(
            &mut writer,
            "sheet_details",
            &["name", "row_count", "column_count", "header_count", "section_count"],
            &sheets,
        )?;

        let sections: Vec<Vec<String>> = self
            .sections
            .iter()
            .map(|s| {
                vec![
                    s.sheet.clone(),
                    s.section_idx.to_string(),
                    s.title.clone(),
                    s.header_row.to_string(),
                    s.start_row.to_string(),
                    s.end_row.to_string(),
                    s.row_count.to_string(),
                    s.column_count.to_string(),
                ]
            })
            .collect();
        write_table(
            &mut writer,
            "sections",
            &[
                "sheet",
                "section_idx",
                "title",
                "header_row",
                "start_row",
                "end_row",
                "row_count",
                "column_count",
            ],
            &sections,
        )?;

        let columns: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| {
                vec![
                    c.sheet.clone(),
                    c.column_idx.to_string(),
                    c.name.clone(),
                    c.start_position.clone(),
                    c.data_type.to_string(),
                    c.samples.join(SAMPLE_SEPARATOR),
                ]
            })
            .collect();
        write_table(
            &mut writer,
            "columns",
            &["sheet", "column_idx", "name", "start_position", "data_type", "samples"],
            &columns,
        )?;
        Ok(())
    }

    /// Convert the payload to a TOON string
    pub fn to_toon_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_toon(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// TOON for a summary-only inspection: one `sheets` table.
pub fn summary_to_toon(info: &FileInfo) -> Result<String> {
    let rows: Vec<Vec<String>> = info
        .sheets
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.row_count.to_string(),
                s.column_count.to_string(),
            ]
        })
        .collect();
    let mut buffer = Vec::new();
    write_table(&mut buffer, "sheets", &["name", "row_count", "column_count"], &rows)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write one tabular array: `name[count]{field,...}:` then indented rows.
fn write_table<W: Write>(
    writer: &mut W,
    name: &str,
    fields: &[&str],
    rows: &[Vec<String>],
) -> std::io::Result<()> {
    writeln!(writer, "{}[{}]{{{}}}:", name, rows.len(), fields.join(","))?;
    for row in rows {
        let values: Vec<String> = row.iter().map(|v| format_toon_value(v)).collect();
        writeln!(writer, "  {}", values.join(","))?;
    }
    Ok(())
}

/// Quote values that contain commas, newlines or quotes
fn format_toon_value(value: &str) -> String {
    if value.contains(',') || value.contains('\n') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
