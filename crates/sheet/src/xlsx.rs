use crate::error::{Result, SheetError};
use calamine::{open_workbook, Data, Reader, SheetType, SheetVisible, Xlsx, XlsxError};
use sheetsense_core::{InspectResult, RowSource};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Convert a calamine cell to its display text.
///
/// Integral floats lose the trailing `.0`, booleans become `TRUE`/`FALSE`,
/// dates are written as their serial number and errors as their Excel code.
pub fn data_to_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_text(*f),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => float_to_text(dt.as_f64()),
        Data::Error(e) => e.to_string(),
    }
}

fn float_to_text(f: f64) -> String {
    // beyond 2^53 integral floats are no longer exact
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// An `.xlsx` workbook read through calamine.
///
/// Only visible worksheets are listed. Rows are padded so that row 1 and
/// column A of the sheet are the first row and first cell of the output,
/// even when the used range starts further down or to the right.
pub struct XlsxSource {
    workbook: Xlsx<BufReader<File>>,
    path: PathBuf,
}

impl fmt::Debug for XlsxSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XlsxSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl XlsxSource {
    /// Open an Excel workbook
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or is not a valid workbook.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let workbook: Xlsx<BufReader<File>> =
            open_workbook(path).map_err(|e: XlsxError| SheetError::Open {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), "opened workbook");
        Ok(Self {
            workbook,
            path: path.to_path_buf(),
        })
    }

    /// Path the workbook was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Visible worksheets in workbook order
    pub fn visible_sheets(&self) -> Vec<String> {
        self.workbook
            .sheets_metadata()
            .iter()
            .filter(|sheet| {
                matches!(sheet.visible, SheetVisible::Visible)
                    && matches!(sheet.typ, SheetType::WorkSheet)
            })
            .map(|sheet| sheet.name.clone())
            .collect()
    }

    /// At most `limit` padded rows of a sheet
    ///
    /// # Errors
    ///
    /// Returns error if the sheet does not exist or cannot be read.
    pub fn read_sheet(&mut self, sheet: &str, limit: usize) -> Result<Vec<Vec<String>>> {
        self.read_sheet_tracked(sheet, limit, &mut |_| {})
    }

    /// [`read_sheet`](Self::read_sheet), calling `on_row` with the 1-based
    /// number of each row as it is converted.
    ///
    /// # Errors
    ///
    /// Returns error if the sheet does not exist or cannot be read.
    pub fn read_sheet_tracked(
        &mut self,
        sheet: &str,
        limit: usize,
        on_row: &mut dyn FnMut(usize),
    ) -> Result<Vec<Vec<String>>> {
        if !self.workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(SheetError::SheetNotFound {
                name: sheet.to_string(),
            });
        }
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e: XlsxError| SheetError::Read {
                sheet: sheet.to_string(),
                message: e.to_string(),
            })?;

        let Some((first_row, first_col)) = range.start() else {
            debug!(sheet, "sheet has no cells");
            return Ok(Vec::new());
        };
        let lead_rows = (first_row as usize).min(limit);
        let lead_cols = first_col as usize;

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(limit.min(lead_rows + range.height()));
        for _ in 0..lead_rows {
            rows.push(Vec::new());
            on_row(rows.len());
        }
        for row in range.rows().take(limit - lead_rows) {
            let mut cells = vec![String::new(); lead_cols];
            cells.extend(row.iter().map(data_to_text));
            rows.push(cells);
            on_row(rows.len());
        }
        debug!(sheet, rows = rows.len(), first_row, first_col, "read sheet rows");
        Ok(rows)
    }
}

impl RowSource for XlsxSource {
    fn sheet_names(&mut self) -> InspectResult<Vec<String>> {
        Ok(self.visible_sheets())
    }

    fn read_rows(&mut self, sheet: &str, limit: usize) -> InspectResult<Vec<Vec<String>>> {
        Ok(self.read_sheet(sheet, limit)?)
    }

    fn read_rows_tracked(
        &mut self,
        sheet: &str,
        limit: usize,
        on_row: &mut dyn FnMut(usize),
    ) -> InspectResult<Vec<Vec<String>>> {
        Ok(self.read_sheet_tracked(sheet, limit, on_row)?)
    }
}
