//! DynamoDB tables

use super::{Collector, primary_listing, record_failure};
use crate::aws::dynamodb::{TableApi, TableInfo};
use crate::aws::pagination::{PagingPolicy, drain, retrying};
use cloud_inventory_common::sentinel::NOT_AVAILABLE;
use cloud_inventory_common::{CellValue, CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use tracing::info;

/// Tables created before on-demand capacity carry no billing summary and
/// are provisioned
const DEFAULT_BILLING_MODE: &str = "PROVISIONED";
/// No SSE description means encryption with an AWS owned key, which the
/// service reports as disabled
const SSE_DISABLED: &str = "DISABLED";

pub struct TableCollector<A> {
    api: A,
    policy: PagingPolicy,
}

fn table_row(table: &TableInfo) -> InventoryRow {
    let (kms_key_arn, status) = match &table.sse {
        Some(sse) => (
            sse.kms_key_arn.as_deref().unwrap_or(NOT_AVAILABLE),
            sse.status.as_deref().unwrap_or(NOT_AVAILABLE),
        ),
        None => (NOT_AVAILABLE, SSE_DISABLED),
    };

    InventoryRow::new()
        .with("TableName", table.name.as_str())
        .with(
            "BillingMode",
            table.billing_mode.as_deref().unwrap_or(DEFAULT_BILLING_MODE),
        )
        .with("KmsKeyArn", kms_key_arn)
        .with("EncryptionStatus", status)
        .with("GlobalSecondaryIndexes", table.global_secondary_indexes)
        .with(
            "DeletionProtection",
            table.deletion_protection.unwrap_or(false),
        )
}

fn unavailable_row(name: &str) -> InventoryRow {
    let na = || CellValue::from(NOT_AVAILABLE);
    InventoryRow::new()
        .with("TableName", name)
        .with("BillingMode", na())
        .with("KmsKeyArn", na())
        .with("EncryptionStatus", na())
        .with("GlobalSecondaryIndexes", na())
        .with("DeletionProtection", na())
}

impl<A: TableApi> TableCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("dynamodb:list-tables", &self.policy, |start| {
            self.api.list_tables(start)
        })
        .await;
        let names = primary_listing(drained, "dynamodb:list-tables", &mut report)?;

        for name in &names {
            let scope = format!("dynamodb:table/{name}");
            let described = retrying(&scope, &self.policy.retry, || {
                self.api.describe_table(name)
            })
            .await;

            let row = match described {
                Ok(table) => table_row(&table),
                Err(e) => {
                    record_failure(&mut report, &scope, &e);
                    unavailable_row(name)
                }
            };
            report.push(row);
        }

        info!(count = report.rows.len(), "Found DynamoDB tables");
        Ok(report)
    }
}

impl<A: TableApi> Collector for TableCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
