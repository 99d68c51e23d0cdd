//! ECR repositories and images

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use super::to_utc;
use aws_sdk_ecr::Client;
use chrono::{DateTime, Utc};
use std::future::Future;

/// An image in a repository
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub digest: Option<String>,
    /// Empty for untagged images
    pub tags: Vec<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub size_bytes: Option<i64>,
}

/// Container registry operations
pub trait RepositoryApi: Send + Sync {
    /// One page of repository names
    fn describe_repositories(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;

    fn describe_images(
        &self,
        repository: &str,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<ImageInfo>, AwsError>> + Send;
}

/// ECR client
pub struct EcrClient {
    client: Client,
}

impl FromAwsContext for EcrClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ecr_client(),
        }
    }
}

impl RepositoryApi for EcrClient {
    async fn describe_repositories(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .describe_repositories()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let names = response
            .repositories()
            .iter()
            .filter_map(|r| r.repository_name().map(str::to_string))
            .collect();
        Ok(Page::new(names, response.next_token()))
    }

    async fn describe_images(
        &self,
        repository: &str,
        next_token: Option<String>,
    ) -> Result<Page<ImageInfo>, AwsError> {
        let response = self
            .client
            .describe_images()
            .repository_name(repository)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let images = response
            .image_details()
            .iter()
            .map(|d| ImageInfo {
                digest: d.image_digest().map(str::to_string),
                tags: d.image_tags().to_vec(),
                pushed_at: d.image_pushed_at().and_then(to_utc),
                size_bytes: d.image_size_in_bytes(),
            })
            .collect();
        Ok(Page::new(images, response.next_token()))
    }
}
