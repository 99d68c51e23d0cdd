//! SSM parameters (metadata only)
//!
//! Parameter Store throttles DescribeParameters aggressively on large
//! accounts; the collector relies on the paging policy's backoff and
//! optional inter-page delay.

use super::{Collector, primary_listing};
use crate::aws::pagination::{PagingPolicy, drain};
use crate::aws::ssm::ParameterApi;
use cloud_inventory_common::sentinel::NOT_AVAILABLE;
use cloud_inventory_common::{CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use tracing::info;

pub struct ParameterCollector<A> {
    api: A,
    policy: PagingPolicy,
}

impl<A: ParameterApi> ParameterCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("ssm:describe-parameters", &self.policy, |token| {
            self.api.describe_parameters(token)
        })
        .await;
        let parameters = primary_listing(drained, "ssm:describe-parameters", &mut report)?;

        for p in parameters {
            report.push(
                InventoryRow::new()
                    .with("Name", p.name)
                    .with("Type", p.parameter_type.as_deref().unwrap_or(NOT_AVAILABLE))
                    .with(
                        "LastModifiedDate",
                        p.last_modified
                            .map(|d| d.to_rfc3339())
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    ),
            );
        }

        info!(count = report.rows.len(), "Found SSM parameters");
        Ok(report)
    }
}

impl<A: ParameterApi> Collector for ParameterCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
