//! Firehose delivery streams, one row per destination

use super::{Collector, or_na, primary_listing, record_failure};
use crate::aws::firehose::{DeliveryStreamApi, DeliveryStreamInfo, DestinationInfo};
use crate::aws::pagination::{PagingPolicy, drain, retrying};
use cloud_inventory_common::sentinel::{NONE, NOT_AVAILABLE};
use cloud_inventory_common::{CellValue, CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use tracing::info;

const STREAM_COLUMNS: [&str; 4] = [
    "DeliveryStreamType",
    "DeliveryStreamStatus",
    "EncryptionKeyType",
    "EncryptionStatus",
];

const DESTINATION_COLUMNS: [&str; 10] = [
    "DestinationId",
    "DestinationType",
    "IndexName",
    "ProcessingEnabled",
    "ProcessorType",
    "ProcessorParameters",
    "S3BackupMode",
    "BucketARN",
    "CompressionFormat",
    "RetryDurationSeconds",
];

pub struct DeliveryStreamCollector<A> {
    api: A,
    policy: PagingPolicy,
}

fn stream_columns(stream: &DeliveryStreamInfo) -> InventoryRow {
    InventoryRow::new()
        .with("DeliveryStreamName", stream.name.as_str())
        .with("DeliveryStreamType", or_na(stream.stream_type.as_deref()))
        .with("DeliveryStreamStatus", or_na(stream.status.as_deref()))
        .with("EncryptionKeyType", or_na(stream.encryption_key_type.as_deref()))
        .with("EncryptionStatus", or_na(stream.encryption_status.as_deref()))
}

fn destination_row(stream: &DeliveryStreamInfo, dest: &DestinationInfo) -> InventoryRow {
    stream_columns(stream)
        .with("DestinationId", dest.id.as_str())
        .with("DestinationType", dest.kind.as_str())
        .with("IndexName", or_na(dest.index_name.as_deref()))
        .with("ProcessingEnabled", or_na(dest.processing_enabled))
        .with("ProcessorType", or_na(dest.processor_type.as_deref()))
        .with("ProcessorParameters", or_na(dest.processor_parameters.as_deref()))
        .with("S3BackupMode", or_na(dest.s3_backup_mode.as_deref()))
        .with("BucketARN", or_na(dest.bucket_arn.as_deref()))
        .with("CompressionFormat", or_na(dest.compression_format.as_deref()))
        .with("RetryDurationSeconds", or_na(dest.retry_duration_secs))
        .with("DestinationCount", stream.destinations.len())
}

/// Rows for one stream; a stream without destinations still gets a row
fn stream_rows(stream: &DeliveryStreamInfo) -> Vec<InventoryRow> {
    if stream.destinations.is_empty() {
        let row = DESTINATION_COLUMNS
            .iter()
            .fold(stream_columns(stream), |row, &column| {
                row.with(column, CellValue::from(NONE))
            });
        return vec![row.with("DestinationCount", 0)];
    }
    stream
        .destinations
        .iter()
        .map(|dest| destination_row(stream, dest))
        .collect()
}

fn unavailable_row(name: &str) -> InventoryRow {
    STREAM_COLUMNS
        .iter()
        .chain(DESTINATION_COLUMNS.iter())
        .fold(
            InventoryRow::new().with("DeliveryStreamName", name),
            |row, &column| row.with(column, CellValue::from(NOT_AVAILABLE)),
        )
        .with("DestinationCount", NOT_AVAILABLE)
}

impl<A: DeliveryStreamApi> DeliveryStreamCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("firehose:list-delivery-streams", &self.policy, |start| {
            self.api.list_delivery_streams(start)
        })
        .await;
        let names = primary_listing(drained, "firehose:list-delivery-streams", &mut report)?;

        for name in &names {
            let scope = format!("firehose:delivery-stream/{name}");
            let described = retrying(&scope, &self.policy.retry, || {
                self.api.describe_delivery_stream(name)
            })
            .await;

            match described {
                Ok(stream) => {
                    for row in stream_rows(&stream) {
                        report.push(row);
                    }
                }
                Err(e) => {
                    record_failure(&mut report, &scope, &e);
                    report.push(unavailable_row(name));
                }
            }
        }

        info!(
            streams = names.len(),
            rows = report.rows.len(),
            "Found Firehose delivery streams"
        );
        Ok(report)
    }
}

impl<A: DeliveryStreamApi> Collector for DeliveryStreamCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
