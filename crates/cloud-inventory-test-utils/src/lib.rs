//! Shared test utilities for cloud-inventory
//!
//! This crate provides common test helpers used by the integration tests
//! without pulling test-only dependencies into the main crate.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region and profile detection for live tests
//! - [`xlsx`]: Reading written workbooks back

pub mod aws;
pub mod xlsx;

// Re-export commonly used items
pub use aws::{get_test_region, test_profile, test_run_id};
pub use xlsx::{Sheet, read_sheets};
