//! SNS topics

use super::{Collector, primary_listing};
use crate::aws::pagination::{PagingPolicy, drain};
use crate::aws::sns::TopicApi;
use cloud_inventory_common::{CollectorReport, InventoryRow, short_name};
use futures::future::BoxFuture;
use tracing::info;

pub struct TopicCollector<A> {
    api: A,
    policy: PagingPolicy,
}

impl<A: TopicApi> TopicCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("sns:list-topics", &self.policy, |token| {
            self.api.list_topics(token)
        })
        .await;
        let arns = primary_listing(drained, "sns:list-topics", &mut report)?;

        for arn in arns {
            report.push(
                InventoryRow::new()
                    .with("TopicName", short_name(&arn))
                    .with("TopicArn", arn.as_str()),
            );
        }

        info!(count = report.rows.len(), "Found SNS topics");
        Ok(report)
    }
}

impl<A: TopicApi> Collector for TopicCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
