//! Markdown inspection report.
//!
//! ```text
//! # Excel Inspect Report
//!
//! ## Sheets
//!
//! | Name | Rows | Columns |
//! | --- | ---: | ---: |
//! | Stock | 12 | 6 |
//! ```
//!
//! The detailed report adds, per sheet, its counts, a columns table and one
//! block per section holding the section's rows.

use crate::error::Result;
use sheetsense_core::{
    is_empty_row, FileInfo, Inspector, RowSource, Section, SheetDetail, SheetRows,
};
use std::fmt::Write;
use tracing::debug;

/// Escape text for a Markdown table cell.
///
/// Backslashes and pipes are escaped, newlines become spaces.
pub fn escape_cell(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('\n', " ")
}

/// Render the report for `info`.
///
/// With `detailed` set, section rows are re-read through `inspector` up to
/// the last section's end row of each sheet.
pub fn render_markdown<S: RowSource>(
    inspector: &mut Inspector<S>,
    info: &FileInfo,
    detailed: bool,
) -> Result<String> {
    let mut out = String::new();
    out.push_str("# Excel Inspect Report\n\n");
    out.push_str("## Sheets\n\n");
    out.push_str("| Name | Rows | Columns |\n");
    out.push_str("| --- | ---: | ---: |\n");
    for sheet in &info.sheets {
        writeln!(
            out,
            "| {} | {} | {} |",
            escape_cell(&sheet.name),
            sheet.row_count,
            sheet.column_count
        )?;
    }

    if !detailed || info.sheet_details.is_empty() {
        return Ok(out);
    }

    let total_sections: usize = info.sheet_details.iter().map(|d| d.sections.len()).sum();
    let mut done_sections = 0;
    if total_sections > 0 {
        inspector.progress().emit("markdown_sections", "", 0, total_sections);
    }

    out.push_str("\n## Sheet Details\n");
    for detail in &info.sheet_details {
        write_sheet_summary(&mut out, detail)?;
        if detail.sections.is_empty() {
            continue;
        }

        let max_end_row = detail.sections.iter().map(|s| s.end_row).max().unwrap_or(0);
        let rows = section_rows(inspector, &detail.name, max_end_row)?;

        out.push_str("\n#### Sections\n\n");
        for (idx, section) in detail.sections.iter().enumerate() {
            write_section(&mut out, idx + 1, section, &rows)?;
            done_sections += 1;
            inspector
                .progress()
                .emit("markdown_sections", &detail.name, done_sections, total_sections);
        }
    }
    Ok(out)
}

fn write_sheet_summary(out: &mut String, detail: &SheetDetail) -> Result<()> {
    writeln!(out, "\n### {}\n", escape_cell(&detail.name))?;
    writeln!(out, "- Rows: {}", detail.row_count)?;
    writeln!(out, "- Columns: {}", detail.column_count)?;
    writeln!(out, "- Headers: {}", detail.headers.len())?;

    if detail.columns.is_empty() {
        return Ok(());
    }
    out.push_str("\n#### Columns\n\n");
    out.push_str("| # | Name | Start | Type | Samples |\n");
    out.push_str("| ---: | --- | --- | --- | --- |\n");
    for (idx, column) in detail.columns.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            idx + 1,
            escape_cell(&column.name),
            escape_cell(&column.start_position),
            column.data_type,
            escape_cell(&column.sample_values.join(", "))
        )?;
    }
    Ok(())
}

fn write_section(out: &mut String, number: usize, section: &Section, rows: &SheetRows) -> Result<()> {
    writeln!(out, "##### Section {}: {}\n", number, escape_cell(&section.title))?;
    writeln!(out, "- Header row: {}", section.header_row)?;
    writeln!(out, "- Start row: {}", section.start_row)?;
    writeln!(out, "- End row: {}", section.end_row)?;
    writeln!(out, "- Rows: {}", section.row_count)?;
    writeln!(out, "- Columns: {}", section.column_count)?;
    out.push('\n');

    let headers: Vec<String> = if section.headers.is_empty() {
        (1..=section.column_count).map(|n| format!("Column {n}")).collect()
    } else {
        section.headers.clone()
    };

    let values = section_values(rows, section, headers.len());
    if values.is_empty() {
        out.push_str("_No section rows found._\n\n");
        return Ok(());
    }

    write_table_row(out, headers.iter().map(|h| escape_cell(h)))?;
    write_table_row(out, headers.iter().map(|_| "---".to_string()))?;
    for row in &values {
        write_table_row(out, row.iter().map(|cell| escape_cell(cell)))?;
    }
    out.push('\n');
    Ok(())
}

fn write_table_row<I: Iterator<Item = String>>(out: &mut String, cells: I) -> Result<()> {
    let cells: Vec<String> = cells.collect();
    writeln!(out, "| {} |", cells.join(" | "))?;
    Ok(())
}

/// Rows `1..=max_row` of a sheet for the section tables.
fn section_rows<S: RowSource>(
    inspector: &mut Inspector<S>,
    sheet: &str,
    max_row: usize,
) -> Result<SheetRows> {
    if max_row == 0 {
        return Ok(SheetRows::new());
    }
    let rows = inspector.sheet_rows_tracked(sheet, max_row, "markdown_scan_rows")?;
    debug!(sheet, rows = rows.len(), "loaded section rows");
    Ok(rows)
}

/// Non-empty rows of a section, padded or cut to `width` cells.
pub fn section_values(rows: &SheetRows, section: &Section, width: usize) -> Vec<Vec<String>> {
    if width == 0 || section.start_row == 0 || section.end_row < section.start_row {
        return Vec::new();
    }
    (section.start_row..=section.end_row)
        .filter_map(|row_num| rows.row(row_num))
        .map(|row| {
            (0..width)
                .map(|idx| row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default())
                .collect::<Vec<String>>()
        })
        .filter(|values| !is_empty_row(values))
        .collect()
}
