//! Collector results and the category bundle handed to report writers

use crate::row::InventoryRow;
use std::fmt;
use thiserror::Error;

/// A non-fatal problem hit while collecting one category.
///
/// The affected row (if any) is still emitted with sentinel values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionWarning {
    /// What was being collected, e.g. `bucket:logs/policy`
    pub scope: String,
    /// Human-readable cause
    pub message: String,
}

impl CollectionWarning {
    pub fn new(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CollectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.message)
    }
}

/// Partial result of one collector: the rows it managed to build and
/// everything that went wrong along the way.
#[derive(Debug, Clone, Default)]
pub struct CollectorReport {
    pub rows: Vec<InventoryRow>,
    pub warnings: Vec<CollectionWarning>,
}

impl CollectorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: InventoryRow) {
        self.rows.push(row);
    }

    pub fn warn(&mut self, scope: impl Into<String>, message: impl fmt::Display) {
        self.warnings
            .push(CollectionWarning::new(scope, message.to_string()));
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Errors building a [`ReportBundle`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    #[error("category '{0}' is already present in the report")]
    DuplicateCategory(String),
}

/// Ordered mapping from category label to its rows.
///
/// Labels are unique. Iteration follows insertion order so that repeated runs
/// produce sheets in the same order.
#[derive(Debug, Clone, Default)]
pub struct ReportBundle {
    sheets: Vec<(String, Vec<InventoryRow>)>,
}

impl ReportBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        label: impl Into<String>,
        rows: Vec<InventoryRow>,
    ) -> Result<(), BundleError> {
        let label = label.into();
        if self.contains(&label) {
            return Err(BundleError::DuplicateCategory(label));
        }
        self.sheets.push((label, rows));
        Ok(())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.sheets.iter().any(|(l, _)| l == label)
    }

    pub fn get(&self, label: &str) -> Option<&[InventoryRow]> {
        self.sheets
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[InventoryRow])> {
        self.sheets.iter().map(|(l, r)| (l.as_str(), r.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Total rows across all categories
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|(_, r)| r.len()).sum()
    }
}
