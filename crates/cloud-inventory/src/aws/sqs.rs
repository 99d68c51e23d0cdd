//! SQS queue listing

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_sqs::Client;
use std::future::Future;

/// Largest page ListQueues accepts
const LIST_QUEUES_PAGE_SIZE: i32 = 1000;

/// Queue listing operations
pub trait QueueApi: Send + Sync {
    /// One page of queue URLs
    fn list_queues(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;
}

/// SQS client
pub struct SqsClient {
    client: Client,
}

impl FromAwsContext for SqsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.sqs_client(),
        }
    }
}

impl QueueApi for SqsClient {
    async fn list_queues(&self, next_token: Option<String>) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_queues()
            .max_results(LIST_QUEUES_PAGE_SIZE)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(Page::new(
            response.queue_urls().to_vec(),
            response.next_token(),
        ))
    }
}
