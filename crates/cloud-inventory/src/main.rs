//! cloud-inventory: AWS resource inventory to a spreadsheet
//!
//! Collects queues, topics, parameters, identities, ECS services, KMS keys,
//! ECR images, API Gateway endpoints, S3 buckets, DynamoDB tables, Kinesis
//! streams and Firehose delivery streams for one account and region, and
//! writes one sheet per category.

use anyhow::{Context, Result};
use clap::Parser;
use cloud_inventory::aggregator::{Aggregator, EmptySheetPolicy, FailurePolicy};
use cloud_inventory::aws::{AwsContext, RetryPolicy};
use cloud_inventory::collectors::build_collectors;
use cloud_inventory::config::{AwsConfig, CollectionConfig, InventoryConfig, ReportConfig};
use cloud_inventory::report::{ReportFormat, write_report};
use cloud_inventory::summary::print_summary;
use cloud_inventory_common::Category;
use cloud_inventory_common::defaults::{DEFAULT_MAX_PAGES, DEFAULT_REGION, DEFAULT_SSM_PAGE_DELAY_MS};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cloud-inventory")]
#[command(about = "Inventory AWS resources into a spreadsheet report")]
#[command(version)]
struct Args {
    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// AWS profile to use (default credential chain when absent)
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Report path (default: aws_resources_report-<region>-<profile>.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format (xlsx, json)
    #[arg(long, default_value = "xlsx")]
    format: ReportFormat,

    /// Only collect these categories (repeatable or comma-separated)
    #[arg(long, value_name = "CATEGORY", value_delimiter = ',')]
    only: Vec<Category>,

    /// Skip these categories (repeatable or comma-separated)
    #[arg(long, value_name = "CATEGORY", value_delimiter = ',')]
    skip: Vec<Category>,

    /// Leave categories with no rows out of the report
    #[arg(long)]
    omit_empty: bool,

    /// Abort the whole run if any category fails
    #[arg(long)]
    fail_fast: bool,

    /// Pause between parameter store pages, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SSM_PAGE_DELAY_MS)]
    ssm_page_delay_ms: u64,

    /// Maximum pages fetched by any single listing
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Don't verify credentials with STS before collecting
    #[arg(long)]
    skip_identity_check: bool,
}

impl From<Args> for InventoryConfig {
    fn from(args: Args) -> Self {
        Self {
            aws: AwsConfig {
                region: args.region,
                profile: args.profile,
                verify_identity: !args.skip_identity_check,
            },
            report: ReportConfig {
                output: args.output,
                format: args.format,
                empty_sheets: if args.omit_empty {
                    EmptySheetPolicy::Omit
                } else {
                    EmptySheetPolicy::Keep
                },
            },
            collection: CollectionConfig {
                only: args.only,
                skip: args.skip,
                failure_policy: if args.fail_fast {
                    FailurePolicy::FailFast
                } else {
                    FailurePolicy::Isolate
                },
                ssm_page_delay: Duration::from_millis(args.ssm_page_delay_ms),
                max_pages: args.max_pages,
                retry: RetryPolicy::default(),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

fn init_tracing() -> Result<()> {
    // AWS SDK crates only at warn and above
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    for target in ["aws_config", "aws_smithy_runtime", "aws_smithy_runtime_api", "aws_sdk_sts"] {
        filter = filter.add_directive(format!("{target}=warn").parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let config: InventoryConfig = args.into();
    config.collection.validate()?;
    let categories = config.collection.selected_categories()?;
    let output = config.output_path();

    info!(
        region = %config.aws.region,
        profile = config.aws.profile_label(),
        categories = ?categories.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        output = %output.display(),
        "Starting inventory"
    );

    let aws = AwsContext::connect(&config.aws)
        .await
        .context("failed to load AWS credentials")?;

    let mut aggregator = Aggregator::new(
        config.collection.failure_policy,
        config.report.empty_sheets,
    );
    for (category, collector) in build_collectors(&aws, &categories, &config.collection) {
        aggregator.register(category.sheet_name(), collector)?;
    }

    let outcome = aggregator.run().await?;

    if outcome.failed().count() == outcome.summaries.len() {
        anyhow::bail!(
            "every selected category failed; no report written (first error: {})",
            outcome
                .failed()
                .find_map(|s| s.error.as_deref())
                .unwrap_or("unknown")
        );
    }
    for summary in outcome.failed() {
        warn!(category = %summary.label, "Category missing from report");
    }

    write_report(&outcome.bundle, config.report.format, &output)
        .with_context(|| format!("failed to write report to {}", output.display()))?;

    print_summary(&outcome, &output);
    info!(
        rows = outcome.bundle.total_rows(),
        warnings = outcome.total_warnings(),
        "Inventory complete"
    );
    Ok(())
}
