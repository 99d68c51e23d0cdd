//! S3 bucket listing and per-bucket configuration lookups
//!
//! Bucket configuration calls must be sent to the bucket's own region, so
//! the client keeps one SDK client per region it has seen.

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_s3::Client;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tracing::debug;

/// Public access block flags; `None` when the flag is not set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublicAccessBlock {
    pub block_public_acls: Option<bool>,
    pub ignore_public_acls: Option<bool>,
    pub block_public_policy: Option<bool>,
    pub restrict_public_buckets: Option<bool>,
}

/// Bucket operations
pub trait BucketApi: Send + Sync {
    /// One page of bucket names
    fn list_buckets(
        &self,
        continuation_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;

    /// Raw location constraint (empty or `None` for us-east-1)
    fn bucket_location(
        &self,
        bucket: &str,
    ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send;

    /// Algorithm of the first default-encryption rule
    fn bucket_encryption(
        &self,
        bucket: &str,
        region: &str,
    ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send;

    /// Versioning status, `None` if versioning was never configured
    fn bucket_versioning(
        &self,
        bucket: &str,
        region: &str,
    ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send;

    fn public_access_block(
        &self,
        bucket: &str,
        region: &str,
    ) -> impl Future<Output = Result<PublicAccessBlock, AwsError>> + Send;

    fn lifecycle_rule_count(
        &self,
        bucket: &str,
        region: &str,
    ) -> impl Future<Output = Result<usize, AwsError>> + Send;

    /// Policy document as returned by the service
    fn bucket_policy(
        &self,
        bucket: &str,
        region: &str,
    ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send;
}

/// S3 client with a cache of region-pinned clients
pub struct S3Client {
    ctx: AwsContext,
    client: Client,
    regional: Mutex<HashMap<String, Client>>,
}

impl FromAwsContext for S3Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            ctx: ctx.clone(),
            client: ctx.s3_client(),
            regional: Mutex::new(HashMap::new()),
        }
    }
}

impl S3Client {
    /// Client for `region`, built on first use.
    fn client_in(&self, region: &str) -> Client {
        if region == self.ctx.region() {
            return self.client.clone();
        }
        // A poisoned lock only means another lookup panicked mid-insert;
        // the map itself is still usable.
        let mut regional = self
            .regional
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        regional
            .entry(region.to_string())
            .or_insert_with(|| {
                debug!(region, "Creating region-pinned S3 client");
                self.ctx.s3_client_in(region)
            })
            .clone()
    }
}

impl BucketApi for S3Client {
    async fn list_buckets(
        &self,
        continuation_token: Option<String>,
    ) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_buckets()
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let names = response
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect();
        Ok(Page::new(names, response.continuation_token()))
    }

    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, AwsError> {
        let response = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(response
            .location_constraint()
            .map(|c| c.as_str().to_string()))
    }

    async fn bucket_encryption(
        &self,
        bucket: &str,
        region: &str,
    ) -> Result<Option<String>, AwsError> {
        let response = self
            .client_in(region)
            .get_bucket_encryption()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(response
            .server_side_encryption_configuration()
            .and_then(|c| c.rules().first())
            .and_then(|r| r.apply_server_side_encryption_by_default())
            .map(|d| d.sse_algorithm().as_str().to_string()))
    }

    async fn bucket_versioning(
        &self,
        bucket: &str,
        region: &str,
    ) -> Result<Option<String>, AwsError> {
        let response = self
            .client_in(region)
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(response.status().map(|s| s.as_str().to_string()))
    }

    async fn public_access_block(
        &self,
        bucket: &str,
        region: &str,
    ) -> Result<PublicAccessBlock, AwsError> {
        let response = self
            .client_in(region)
            .get_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(response
            .public_access_block_configuration()
            .map(|c| PublicAccessBlock {
                block_public_acls: c.block_public_acls(),
                ignore_public_acls: c.ignore_public_acls(),
                block_public_policy: c.block_public_policy(),
                restrict_public_buckets: c.restrict_public_buckets(),
            })
            .unwrap_or_default())
    }

    async fn lifecycle_rule_count(&self, bucket: &str, region: &str) -> Result<usize, AwsError> {
        let response = self
            .client_in(region)
            .get_bucket_lifecycle_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(response.rules().len())
    }

    async fn bucket_policy(&self, bucket: &str, region: &str) -> Result<Option<String>, AwsError> {
        let response = self
            .client_in(region)
            .get_bucket_policy()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(response.policy().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_regional_clients_are_cached() {
        let ctx = AwsContext::load("us-east-1", None).await;
        let s3 = S3Client::from_context(&ctx);

        let a = s3.client_in("eu-west-1");
        let b = s3.client_in("eu-west-1");
        s3.client_in("us-east-1");

        assert_eq!(a.config().region().map(|r| r.as_ref()), Some("eu-west-1"));
        assert_eq!(b.config().region().map(|r| r.as_ref()), Some("eu-west-1"));
        // The home region reuses the default client
        assert_eq!(s3.regional.lock().unwrap().len(), 1);
    }
}
