//! KMS keys and aliases

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_kms::Client;
use std::future::Future;

/// An alias entry
#[derive(Debug, Clone, PartialEq)]
pub struct AliasInfo {
    /// e.g. `alias/orders`
    pub name: String,
    /// Unset for AWS-reserved aliases that point nowhere yet
    pub target_key_id: Option<String>,
}

/// A key entry
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInfo {
    pub key_id: String,
    pub key_arn: Option<String>,
}

/// Key management operations
pub trait KeyApi: Send + Sync {
    fn list_aliases(
        &self,
        marker: Option<String>,
    ) -> impl Future<Output = Result<Page<AliasInfo>, AwsError>> + Send;

    fn list_keys(
        &self,
        marker: Option<String>,
    ) -> impl Future<Output = Result<Page<KeyInfo>, AwsError>> + Send;
}

/// KMS client
pub struct KmsClient {
    client: Client,
}

impl FromAwsContext for KmsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.kms_client(),
        }
    }
}

impl KeyApi for KmsClient {
    async fn list_aliases(&self, marker: Option<String>) -> Result<Page<AliasInfo>, AwsError> {
        let response = self
            .client
            .list_aliases()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let aliases = response
            .aliases()
            .iter()
            .filter_map(|a| {
                Some(AliasInfo {
                    name: a.alias_name()?.to_string(),
                    target_key_id: a.target_key_id().map(str::to_string),
                })
            })
            .collect();

        // NextMarker is only meaningful while Truncated is set
        let next = response.next_marker().filter(|_| response.truncated());
        Ok(Page::new(aliases, next))
    }

    async fn list_keys(&self, marker: Option<String>) -> Result<Page<KeyInfo>, AwsError> {
        let response = self
            .client
            .list_keys()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let keys = response
            .keys()
            .iter()
            .filter_map(|k| {
                Some(KeyInfo {
                    key_id: k.key_id()?.to_string(),
                    key_arn: k.key_arn().map(str::to_string),
                })
            })
            .collect();

        let next = response.next_marker().filter(|_| response.truncated());
        Ok(Page::new(keys, next))
    }
}
