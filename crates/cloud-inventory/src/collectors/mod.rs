//! Per-category collectors
//!
//! A collector turns one service's listings into inventory rows. It drains
//! every page, enriches each item, and degrades failed fields to sentinels
//! instead of failing the whole category. Only a primary listing that
//! yields nothing at all is an error.

pub mod buckets;
pub mod containers;
pub mod delivery;
pub mod gateway;
pub mod identities;
pub mod images;
pub mod keys;
pub mod parameters;
pub mod queues;
pub mod streams;
pub mod tables;
pub mod topics;

pub use buckets::BucketCollector;
pub use containers::ContainerCollector;
pub use delivery::DeliveryStreamCollector;
pub use gateway::GatewayCollector;
pub use identities::IdentityCollector;
pub use images::ImageCollector;
pub use keys::KeyCollector;
pub use parameters::ParameterCollector;
pub use queues::QueueCollector;
pub use streams::StreamCollector;
pub use tables::TableCollector;
pub use topics::TopicCollector;

use crate::aws::error::AwsError;
use crate::aws::pagination::{Drained, PaginationError, PagingPolicy};
use crate::aws::{
    ApiGatewayClient, AwsContext, DynamoDbClient, EcrClient, EcsClient, FirehoseClient,
    FromAwsContext, KinesisClient, KmsClient, S3Client, SesClient, SnsClient, SqsClient,
    SsmClient,
};
use crate::config::CollectionConfig;
use cloud_inventory_common::sentinel::NOT_AVAILABLE;
use cloud_inventory_common::{Category, CellValue, CollectorReport};
use futures::future::BoxFuture;
use tracing::{debug, warn};

/// A source of rows for one report category.
///
/// Object safe so heterogeneous collectors can be driven together.
pub trait Collector: Send + Sync {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>>;
}

/// Build the SDK-backed collector for each selected category.
pub fn build_collectors(
    ctx: &AwsContext,
    categories: &[Category],
    collection: &CollectionConfig,
) -> Vec<(Category, Box<dyn Collector>)> {
    let policy = collection.paging_policy();

    categories
        .iter()
        .map(|&category| {
            let collector: Box<dyn Collector> = match category {
                Category::Sqs => Box::new(QueueCollector::new(
                    SqsClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::Sns => Box::new(TopicCollector::new(
                    SnsClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::Ssm => Box::new(ParameterCollector::new(
                    SsmClient::from_context(ctx),
                    policy.clone().with_page_delay(collection.ssm_page_delay),
                )),
                Category::Ses => Box::new(IdentityCollector::new(
                    SesClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::Ecs => Box::new(ContainerCollector::new(
                    EcsClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::Kms => Box::new(KeyCollector::new(
                    KmsClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::Ecr => Box::new(ImageCollector::new(
                    EcrClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::ApiGateway => Box::new(GatewayCollector::new(
                    ApiGatewayClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::S3 => Box::new(BucketCollector::new(
                    S3Client::from_context(ctx),
                    policy.clone(),
                    ctx.region(),
                )),
                Category::DynamoDb => Box::new(TableCollector::new(
                    DynamoDbClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::Kinesis => Box::new(StreamCollector::new(
                    KinesisClient::from_context(ctx),
                    policy.clone(),
                )),
                Category::Firehose => Box::new(DeliveryStreamCollector::new(
                    FirehoseClient::from_context(ctx),
                    policy.clone(),
                )),
            };
            (category, collector)
        })
        .collect()
}

/// Unwrap the listing a category is built on.
///
/// Fails when not even the first page could be fetched. A later
/// interruption keeps what was gathered and becomes a warning.
pub(crate) fn primary_listing<T>(
    drained: Drained<T>,
    scope: &str,
    report: &mut CollectorReport,
) -> anyhow::Result<Vec<T>> {
    let failed = drained.failed_outright();
    let (items, interrupted) = drained.into_parts();
    match interrupted {
        Some(err) if failed => {
            let context = match provider_error(&err).and_then(AwsError::suggestion) {
                Some(hint) => format!("{scope}: listing failed (hint: {hint})"),
                None => format!("{scope}: listing failed"),
            };
            Err(anyhow::Error::new(err).context(context))
        }
        Some(err) => {
            warn!(scope, kept = items.len(), error = %err, "Listing interrupted, keeping partial results");
            report.warn(scope, &err);
            Ok(items)
        }
        None => Ok(items),
    }
}

/// Unwrap a listing nested under a parent item.
///
/// Returns `None` when nothing could be listed; the caller emits the parent
/// with sentinel fields. Expected absence (the parent vanished between
/// calls) is not a warning.
pub(crate) fn child_listing<T>(
    drained: Drained<T>,
    scope: &str,
    report: &mut CollectorReport,
) -> Option<Vec<T>> {
    let failed = drained.failed_outright();
    let (items, interrupted) = drained.into_parts();
    match interrupted {
        Some(PaginationError::Provider(err)) if failed => {
            record_failure(report, scope, &err);
            None
        }
        Some(err) if failed => {
            warn!(scope, error = %err, "Listing failed");
            report.warn(scope, &err);
            None
        }
        Some(err) => {
            warn!(scope, kept = items.len(), error = %err, "Listing interrupted, keeping partial results");
            report.warn(scope, &err);
            Some(items)
        }
        None => Some(items),
    }
}

/// Record a failed enrichment call. Expected absence stays silent.
pub(crate) fn record_failure(report: &mut CollectorReport, scope: &str, err: &AwsError) {
    if err.is_not_found() {
        debug!(scope, error = %err, "Resource absent");
        return;
    }
    warn!(scope, error = %err, "Lookup failed, using placeholder");
    report.warn(scope, err);
}

/// Cell for an optional field, `N/A` when absent
pub(crate) fn or_na<T: Into<CellValue>>(value: Option<T>) -> CellValue {
    value.map_or_else(|| NOT_AVAILABLE.into(), Into::into)
}

fn provider_error(err: &PaginationError) -> Option<&AwsError> {
    match err {
        PaginationError::Provider(e) => Some(e),
        _ => None,
    }
}
