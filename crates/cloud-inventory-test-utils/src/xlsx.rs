//! Workbook read-back for report tests

use calamine::{Reader, Xlsx, XlsxError, open_workbook};
use std::path::Path;

pub use calamine::Data;

/// One worksheet as read back from disk
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    /// All rows including the header row
    pub rows: Vec<Vec<Data>>,
}

impl Sheet {
    /// Header row as text; empty for a blank sheet
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default()
    }

    /// Data rows, without the header
    pub fn body(&self) -> &[Vec<Data>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Cell under `header` in data row `row`
    pub fn cell(&self, row: usize, header: &str) -> Option<&Data> {
        let col = self.headers().iter().position(|h| h == header)?;
        self.body().get(row)?.get(col)
    }
}

/// Read every sheet of an xlsx file, in workbook order.
pub fn read_sheets(path: impl AsRef<Path>) -> Result<Vec<Sheet>, XlsxError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let rows = range.rows().map(<[Data]>::to_vec).collect();
        sheets.push(Sheet { name, rows });
    }
    Ok(sheets)
}
