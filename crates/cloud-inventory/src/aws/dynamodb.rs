//! DynamoDB table listing

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_dynamodb::Client;
use std::future::Future;

/// Server-side encryption settings of a table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SseInfo {
    pub status: Option<String>,
    pub kms_key_arn: Option<String>,
}

/// The parts of a table description that go into the report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableInfo {
    pub name: String,
    /// `None` for tables created before billing summaries existed
    pub billing_mode: Option<String>,
    pub sse: Option<SseInfo>,
    pub global_secondary_indexes: usize,
    pub deletion_protection: Option<bool>,
}

/// Table operations
pub trait TableApi: Send + Sync {
    /// One page of table names, starting after `exclusive_start`
    fn list_tables(
        &self,
        exclusive_start: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;

    fn describe_table(&self, name: &str)
    -> impl Future<Output = Result<TableInfo, AwsError>> + Send;
}

/// DynamoDB client
pub struct DynamoDbClient {
    client: Client,
}

impl FromAwsContext for DynamoDbClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.dynamodb_client(),
        }
    }
}

impl TableApi for DynamoDbClient {
    async fn list_tables(&self, exclusive_start: Option<String>) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_tables()
            .set_exclusive_start_table_name(exclusive_start)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(Page::new(
            response.table_names().to_vec(),
            response.last_evaluated_table_name(),
        ))
    }

    async fn describe_table(&self, name: &str) -> Result<TableInfo, AwsError> {
        let response = self
            .client
            .describe_table()
            .table_name(name)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let Some(table) = response.table() else {
            return Ok(TableInfo {
                name: name.to_string(),
                ..TableInfo::default()
            });
        };

        Ok(TableInfo {
            name: table.table_name().unwrap_or(name).to_string(),
            billing_mode: table
                .billing_mode_summary()
                .and_then(|b| b.billing_mode())
                .map(|m| m.as_str().to_string()),
            sse: table.sse_description().map(|sse| SseInfo {
                status: sse.status().map(|s| s.as_str().to_string()),
                kms_key_arn: sse.kms_master_key_arn().map(str::to_string),
            }),
            global_secondary_indexes: table.global_secondary_indexes().len(),
            deletion_protection: table.deletion_protection_enabled(),
        })
    }
}
