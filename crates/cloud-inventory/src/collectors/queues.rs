//! SQS queues

use super::{Collector, primary_listing};
use crate::aws::pagination::{PagingPolicy, drain};
use crate::aws::sqs::QueueApi;
use cloud_inventory_common::{CollectorReport, InventoryRow, short_name};
use futures::future::BoxFuture;
use tracing::info;

pub struct QueueCollector<A> {
    api: A,
    policy: PagingPolicy,
}

impl<A: QueueApi> QueueCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("sqs:list-queues", &self.policy, |token| {
            self.api.list_queues(token)
        })
        .await;
        let urls = primary_listing(drained, "sqs:list-queues", &mut report)?;

        for url in urls {
            report.push(
                InventoryRow::new()
                    .with("QueueName", short_name(&url))
                    .with("QueueUrl", url.as_str()),
            );
        }

        info!(count = report.rows.len(), "Found SQS queues");
        Ok(report)
    }
}

impl<A: QueueApi> Collector for QueueCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
