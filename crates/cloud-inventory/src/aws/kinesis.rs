//! Kinesis data stream listing

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_kinesis::Client;
use std::future::Future;

/// The parts of a stream summary that go into the report.
///
/// Everything but the name is absent when the service returned no summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSummary {
    pub name: String,
    pub arn: Option<String>,
    pub status: Option<String>,
    /// `None` for streams created before on-demand capacity existed
    pub mode: Option<String>,
    pub open_shard_count: Option<i32>,
    pub retention_period_hours: Option<i32>,
    pub encryption_type: Option<String>,
}

/// Stream operations
pub trait StreamApi: Send + Sync {
    /// One page of stream names
    fn list_streams(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;

    fn describe_stream_summary(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<StreamSummary, AwsError>> + Send;
}

/// Kinesis client
pub struct KinesisClient {
    client: Client,
}

impl FromAwsContext for KinesisClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.kinesis_client(),
        }
    }
}

impl StreamApi for KinesisClient {
    async fn list_streams(&self, next_token: Option<String>) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_streams()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let next = if response.has_more_streams() {
            response.next_token()
        } else {
            None
        };
        Ok(Page::new(response.stream_names().to_vec(), next))
    }

    async fn describe_stream_summary(&self, name: &str) -> Result<StreamSummary, AwsError> {
        let response = self
            .client
            .describe_stream_summary()
            .stream_name(name)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let Some(summary) = response.stream_description_summary() else {
            return Ok(StreamSummary {
                name: name.to_string(),
                ..StreamSummary::default()
            });
        };

        Ok(StreamSummary {
            name: summary.stream_name().to_string(),
            arn: Some(summary.stream_arn().to_string()),
            status: Some(summary.stream_status().as_str().to_string()),
            mode: summary
                .stream_mode_details()
                .map(|d| d.stream_mode().as_str().to_string()),
            open_shard_count: Some(summary.open_shard_count()),
            retention_period_hours: Some(summary.retention_period_hours()),
            encryption_type: summary.encryption_type().map(|e| e.as_str().to_string()),
        })
    }
}
