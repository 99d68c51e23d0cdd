//! S3 buckets and their security-relevant configuration
//!
//! The bucket's region is resolved first; the five configuration lookups
//! then run concurrently against that region.

use super::{Collector, primary_listing, record_failure};
use crate::aws::error::AwsError;
use crate::aws::pagination::{PagingPolicy, drain, retrying};
use crate::aws::s3::{BucketApi, PublicAccessBlock};
use cloud_inventory_common::sentinel::{EMPTY_POLICY, NOT_AVAILABLE};
use cloud_inventory_common::{CellValue, CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use tracing::info;

/// Region of buckets created without a location constraint
const LEGACY_DEFAULT_REGION: &str = "us-east-1";

pub struct BucketCollector<A> {
    api: A,
    policy: PagingPolicy,
    default_region: String,
}

/// Map a LocationConstraint to a region name.
fn normalize_location(constraint: Option<&str>) -> String {
    match constraint {
        None | Some("") => LEGACY_DEFAULT_REGION.to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// Policy text re-serialized compactly; raw text if it is not JSON.
fn compact_policy(policy: &str) -> String {
    serde_json::from_str::<serde_json::Value>(policy)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| policy.to_string())
}

fn flag(value: Option<bool>) -> CellValue {
    value.map_or_else(|| NOT_AVAILABLE.into(), CellValue::from)
}

impl<A: BucketApi> BucketCollector<A> {
    pub fn new(api: A, policy: PagingPolicy, default_region: &str) -> Self {
        Self {
            api,
            policy,
            default_region: default_region.to_string(),
        }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("s3:list-buckets", &self.policy, |token| {
            self.api.list_buckets(token)
        })
        .await;
        let buckets = primary_listing(drained, "s3:list-buckets", &mut report)?;

        for bucket in &buckets {
            let row = self.describe_bucket(bucket, &mut report).await;
            report.push(row);
        }

        info!(count = report.rows.len(), "Found S3 buckets");
        Ok(report)
    }

    async fn describe_bucket(&self, bucket: &str, report: &mut CollectorReport) -> InventoryRow {
        let scope = format!("s3:bucket/{bucket}");
        let retry = &self.policy.retry;

        let location = match retrying(&scope, retry, || self.api.bucket_location(bucket)).await {
            Ok(constraint) => Some(normalize_location(constraint.as_deref())),
            Err(e) => {
                record_failure(report, &format!("{scope}/location"), &e);
                None
            }
        };
        let region = location.as_deref().unwrap_or(&self.default_region);

        let (encryption, versioning, access_block, lifecycle, policy) = tokio::join!(
            retrying(&scope, retry, || self.api.bucket_encryption(bucket, region)),
            retrying(&scope, retry, || self.api.bucket_versioning(bucket, region)),
            retrying(&scope, retry, || self.api.public_access_block(bucket, region)),
            retrying(&scope, retry, || self.api.lifecycle_rule_count(bucket, region)),
            retrying(&scope, retry, || self.api.bucket_policy(bucket, region)),
        );

        let mut failed = |field: &str, e: &AwsError| {
            record_failure(report, &format!("{scope}/{field}"), e);
        };

        let encryption = match encryption {
            Ok(algorithm) => algorithm.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            Err(e) => {
                failed("encryption", &e);
                NOT_AVAILABLE.to_string()
            }
        };
        let versioning = match versioning {
            Ok(status) => status.unwrap_or_else(|| "Disabled".to_string()),
            Err(e) => {
                failed("versioning", &e);
                NOT_AVAILABLE.to_string()
            }
        };
        let access_block = match access_block {
            Ok(block) => block,
            Err(e) => {
                failed("public-access-block", &e);
                PublicAccessBlock::default()
            }
        };
        let lifecycle: CellValue = match lifecycle {
            Ok(count) => count.into(),
            Err(e) if e.is_not_found() => 0usize.into(),
            Err(e) => {
                failed("lifecycle", &e);
                NOT_AVAILABLE.into()
            }
        };
        let policy = match policy {
            Ok(Some(text)) => compact_policy(&text),
            Ok(None) => EMPTY_POLICY.to_string(),
            Err(e) => {
                failed("policy", &e);
                EMPTY_POLICY.to_string()
            }
        };

        InventoryRow::new()
            .with("Bucket", bucket)
            .with("Location", location.as_deref().unwrap_or(NOT_AVAILABLE))
            .with("Encryption", encryption)
            .with("Versioning", versioning)
            .with("BlockPublicAcls", flag(access_block.block_public_acls))
            .with("IgnorePublicAcls", flag(access_block.ignore_public_acls))
            .with("BlockPublicPolicy", flag(access_block.block_public_policy))
            .with("RestrictPublicBuckets", flag(access_block.restrict_public_buckets))
            .with("LifecycleRules", lifecycle)
            .with("Policy", policy)
    }
}

impl<A: BucketApi> Collector for BucketCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
