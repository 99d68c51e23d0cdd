//! cloud-inventory - AWS resource inventory reports
//!
//! Walks twelve AWS services in one account and region, and writes one sheet
//! per category to a spreadsheet (or JSON) report.

pub mod aggregator;
pub mod aws;
pub mod collectors;
pub mod config;
pub mod report;
pub mod summary;

#[cfg(test)]
mod testing;
