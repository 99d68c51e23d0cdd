//! Default configuration values
//!
//! These constants keep the CLI defaults and library defaults in one place.

/// Region used when neither `--region` nor `AWS_REGION` is set
pub const DEFAULT_REGION: &str = "us-east-1";

/// Profile label used in the report file name when no profile is given
pub const DEFAULT_PROFILE_LABEL: &str = "default";

/// Report file stem; region and profile are appended
pub const REPORT_FILE_STEM: &str = "aws_resources_report";

/// Hard cap on pages per listing loop
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Inter-page delay for the parameter store listing, in milliseconds.
///
/// DescribeParameters throttles well below the other listings; the pause
/// applies on top of the throttle backoff.
pub const DEFAULT_SSM_PAGE_DELAY_MS: u64 = 2_000;

/// First backoff delay after a throttled call, in milliseconds
pub const DEFAULT_RETRY_MIN_DELAY_MS: u64 = 500;

/// Backoff ceiling, in milliseconds
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 20_000;

/// Maximum retries of one throttled call
pub const DEFAULT_RETRY_MAX_TIMES: usize = 6;
