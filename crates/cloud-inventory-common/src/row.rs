//! Inventory rows
//!
//! A row is an ordered set of `(column, value)` pairs. Each collector picks
//! its own columns; there is no schema shared across categories.

use serde::Serialize;
use serde::ser::SerializeMap;
use std::fmt;

/// A single scalar cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text content, if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::Text(s.clone())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(n: $t) -> Self {
                    CellValue::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u32, u64, usize);

/// One inventory record: column name to scalar value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryRow {
    cells: Vec<(String, CellValue)>,
}

impl InventoryRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column. An existing column keeps its position and takes the new value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Text value of a column (convenience for tests and logging).
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(CellValue::as_text)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for InventoryRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_preserves_first_position() {
        let mut row = InventoryRow::new().with("a", "1").with("b", 2).with("c", true);
        row.set("a", "replaced");

        let columns: Vec<_> = row.columns().collect();
        assert_eq!(columns, vec!["a", "b", "c"]);
        assert_eq!(row.text("a"), Some("replaced"));
        assert_eq!(row.get("b"), Some(&CellValue::Number(2.0)));
        assert_eq!(row.get("c"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_json_keeps_column_order() {
        let row = InventoryRow::new()
            .with("Zeta", "z")
            .with("Alpha", 1.5)
            .with("Mid", false);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Zeta":"z","Alpha":1.5,"Mid":false}"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::from("x").to_string(), "x");
        assert_eq!(CellValue::from(3usize).to_string(), "3");
        assert_eq!(CellValue::from(false).to_string(), "false");
    }
}
