//! Live inventory tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_live_integration -- --ignored
//! ```
//!
//! They only read; nothing in the account is created or changed.

use cloud_inventory::aggregator::{Aggregator, EmptySheetPolicy, FailurePolicy};
use cloud_inventory::aws::AwsContext;
use cloud_inventory::collectors::build_collectors;
use cloud_inventory::config::{AwsConfig, CollectionConfig};
use cloud_inventory::report::{ReportFormat, write_report};
use cloud_inventory_common::Category;
use cloud_inventory_test_utils::{get_test_region, read_sheets, test_profile};

fn aws_config() -> AwsConfig {
    AwsConfig {
        region: get_test_region(),
        profile: test_profile(),
        verify_identity: true,
    }
}

/// Credentials resolve and STS returns an account
#[tokio::test]
#[ignore]
async fn test_connect_validates_identity() {
    let ctx = AwsContext::connect(&aws_config())
        .await
        .expect("AWS credentials required - set AWS_PROFILE or AWS_ACCESS_KEY_ID");

    let account = ctx.account_id().expect("Should have an account id");
    assert_eq!(account.len(), 12);
    assert!(account.chars().all(|c| c.is_ascii_digit()));
}

/// Cheap categories end to end, into a real workbook
#[tokio::test]
#[ignore]
async fn test_inventory_to_workbook() {
    let ctx = AwsContext::connect(&aws_config())
        .await
        .expect("AWS credentials required");

    let collection = CollectionConfig {
        only: vec![Category::Sqs, Category::Sns, Category::DynamoDb],
        ..CollectionConfig::default()
    };
    let categories = collection.selected_categories().unwrap();

    let mut aggregator = Aggregator::new(FailurePolicy::Isolate, EmptySheetPolicy::Keep);
    for (category, collector) in build_collectors(&ctx, &categories, &collection) {
        aggregator.register(category.sheet_name(), collector).unwrap();
    }
    let outcome = aggregator.run().await.expect("Isolated runs never fail");

    assert_eq!(outcome.summaries.len(), 3);
    for summary in &outcome.summaries {
        println!("{}: {} rows ({})", summary.label, summary.rows, summary.status());
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("live.xlsx");
    write_report(&outcome.bundle, ReportFormat::Xlsx, &path).expect("Should write report");

    let names: Vec<_> = read_sheets(&path)
        .expect("Should read report back")
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["SQS", "SNS", "DynamoDB"]);
}

/// A bogus profile fails before any collector runs
#[tokio::test]
#[ignore]
async fn test_unknown_profile_is_fatal() {
    let config = AwsConfig {
        profile: Some("cloud-inventory-no-such-profile".to_string()),
        ..aws_config()
    };
    assert!(AwsContext::connect(&config).await.is_err());
}
