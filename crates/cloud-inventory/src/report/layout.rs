//! Column layout of one sheet

use cloud_inventory_common::{CellValue, InventoryRow};

/// Headers and aligned cells for one category
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout<'a> {
    /// Union of the rows' columns in first-seen order
    pub headers: Vec<&'a str>,
    /// One entry per row; `None` where a row lacks the column
    pub cells: Vec<Vec<Option<&'a CellValue>>>,
}

impl<'a> SheetLayout<'a> {
    pub fn from_rows(rows: &'a [InventoryRow]) -> Self {
        let mut headers: Vec<&str> = Vec::new();
        for row in rows {
            for column in row.columns() {
                if !headers.contains(&column) {
                    headers.push(column);
                }
            }
        }

        let cells = rows
            .iter()
            .map(|row| headers.iter().map(|h| row.get(h)).collect())
            .collect();

        Self { headers, cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
