//! SNS topic listing

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_sns::Client;
use std::future::Future;

/// Topic listing operations
pub trait TopicApi: Send + Sync {
    /// One page of topic ARNs
    fn list_topics(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;
}

/// SNS client
pub struct SnsClient {
    client: Client,
}

impl FromAwsContext for SnsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.sns_client(),
        }
    }
}

impl TopicApi for SnsClient {
    async fn list_topics(&self, next_token: Option<String>) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_topics()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let arns = response
            .topics()
            .iter()
            .filter_map(|t| t.topic_arn().map(str::to_string))
            .collect();
        Ok(Page::new(arns, response.next_token()))
    }
}
