//! cloud-inventory-common - Shared inventory types
//!
//! This crate provides the types that flow between collectors, the
//! aggregator and the report writers, without any AWS SDK dependencies
//! to keep it lightweight.
//!
//! ## Modules
//!
//! - [`category`]: Inventory categories and their sheet labels
//! - [`defaults`]: Default configuration values
//! - [`naming`]: Identifier normalization (ARN / URL to short name)
//! - [`report`]: Per-collector results and the category bundle
//! - [`row`]: Row and cell types
//! - [`sentinel`]: Placeholder values for missing or failed data

pub mod category;
pub mod defaults;
pub mod naming;
pub mod report;
pub mod row;
pub mod sentinel;

// Re-export commonly used types
pub use category::Category;
pub use naming::short_name;
pub use report::{BundleError, CollectionWarning, CollectorReport, ReportBundle};
pub use row::{CellValue, InventoryRow};
