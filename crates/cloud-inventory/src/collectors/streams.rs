//! Kinesis data streams

use super::{Collector, or_na, primary_listing, record_failure};
use crate::aws::kinesis::{StreamApi, StreamSummary};
use crate::aws::pagination::{PagingPolicy, drain, retrying};
use cloud_inventory_common::sentinel::NOT_AVAILABLE;
use cloud_inventory_common::{CellValue, CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use tracing::info;

const COLUMNS: [&str; 6] = [
    "StreamStatus",
    "StreamMode",
    "OpenShardCount",
    "RetentionPeriodHours",
    "EncryptionType",
    "StreamARN",
];

pub struct StreamCollector<A> {
    api: A,
    policy: PagingPolicy,
}

fn stream_row(stream: StreamSummary) -> InventoryRow {
    InventoryRow::new()
        .with("StreamName", stream.name)
        .with("StreamStatus", or_na(stream.status))
        .with("StreamMode", or_na(stream.mode))
        .with("OpenShardCount", or_na(stream.open_shard_count))
        .with("RetentionPeriodHours", or_na(stream.retention_period_hours))
        // Unencrypted streams report no type at all
        .with("EncryptionType", stream.encryption_type.unwrap_or_else(|| "NONE".to_string()))
        .with("StreamARN", or_na(stream.arn))
}

fn unavailable_row(name: &str) -> InventoryRow {
    COLUMNS.iter().fold(
        InventoryRow::new().with("StreamName", name),
        |row, &column| row.with(column, CellValue::from(NOT_AVAILABLE)),
    )
}

impl<A: StreamApi> StreamCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("kinesis:list-streams", &self.policy, |token| {
            self.api.list_streams(token)
        })
        .await;
        let names = primary_listing(drained, "kinesis:list-streams", &mut report)?;

        for name in &names {
            let scope = format!("kinesis:stream/{name}");
            let described = retrying(&scope, &self.policy.retry, || {
                self.api.describe_stream_summary(name)
            })
            .await;

            let row = match described {
                Ok(stream) => stream_row(stream),
                Err(e) => {
                    record_failure(&mut report, &scope, &e);
                    unavailable_row(name)
                }
            };
            report.push(row);
        }

        info!(count = report.rows.len(), "Found Kinesis streams");
        Ok(report)
    }
}

impl<A: StreamApi> Collector for StreamCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
