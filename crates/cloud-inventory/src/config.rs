//! Configuration types for an inventory run
//!
//! Built once from the command line and passed down explicitly; nothing
//! here is global or mutated after construction.

use crate::aggregator::{EmptySheetPolicy, FailurePolicy};
use crate::aws::pagination::{PagingPolicy, RetryPolicy};
use crate::report::ReportFormat;
use cloud_inventory_common::Category;
use cloud_inventory_common::defaults::{
    DEFAULT_MAX_PAGES, DEFAULT_PROFILE_LABEL, DEFAULT_REGION, DEFAULT_SSM_PAGE_DELAY_MS,
    REPORT_FILE_STEM,
};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no categories selected (--only and --skip exclude everything)")]
    NothingSelected,

    #[error("--max-pages must be at least 1")]
    ZeroPageLimit,
}

/// AWS connection settings
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// AWS region
    pub region: String,
    /// Named profile; `None` uses the default credential chain
    pub profile: Option<String>,
    /// Check credentials against STS before collecting
    pub verify_identity: bool,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
            verify_identity: true,
        }
    }
}

impl AwsConfig {
    /// Profile as it appears in the report file name
    pub fn profile_label(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE_LABEL)
    }
}

/// Where and how the report is written
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Explicit destination; derived from region and profile when absent
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
    pub empty_sheets: EmptySheetPolicy,
}

impl ReportConfig {
    /// Destination path, e.g. `aws_resources_report-us-east-1-default.xlsx`.
    pub fn output_path(&self, aws: &AwsConfig) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => PathBuf::from(format!(
                "{REPORT_FILE_STEM}-{}-{}.{}",
                aws.region,
                aws.profile_label(),
                self.format.extension()
            )),
        }
    }
}

/// Which categories run and how they page
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// When non-empty, only these categories run
    pub only: Vec<Category>,
    /// Removed after `only` is applied
    pub skip: Vec<Category>,
    pub failure_policy: FailurePolicy,
    /// Pause between parameter store pages
    pub ssm_page_delay: Duration,
    pub max_pages: usize,
    pub retry: RetryPolicy,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            skip: Vec::new(),
            failure_policy: FailurePolicy::default(),
            ssm_page_delay: Duration::from_millis(DEFAULT_SSM_PAGE_DELAY_MS),
            max_pages: DEFAULT_MAX_PAGES,
            retry: RetryPolicy::default(),
        }
    }
}

impl CollectionConfig {
    /// Categories to collect, in report order.
    pub fn selected_categories(&self) -> Result<Vec<Category>, ConfigError> {
        let selected: Vec<_> = Category::ALL
            .into_iter()
            .filter(|c| self.only.is_empty() || self.only.contains(c))
            .filter(|c| !self.skip.contains(c))
            .collect();

        if selected.is_empty() {
            return Err(ConfigError::NothingSelected);
        }
        Ok(selected)
    }

    /// Paging policy shared by every listing loop
    pub fn paging_policy(&self) -> PagingPolicy {
        PagingPolicy {
            retry: self.retry.clone(),
            page_delay: Duration::ZERO,
            max_pages: self.max_pages,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroPageLimit);
        }
        self.selected_categories().map(|_| ())
    }
}

/// Complete configuration for one run
#[derive(Debug, Clone, Default)]
pub struct InventoryConfig {
    pub aws: AwsConfig,
    pub report: ReportConfig,
    pub collection: CollectionConfig,
}

impl InventoryConfig {
    pub fn output_path(&self) -> PathBuf {
        self.report.output_path(&self.aws)
    }
}
