//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating every service client from the same config.

use super::account::{AccountId, CallerIdentity, verify_caller};
use crate::config::AwsConfig;
use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;
use tracing::info;

/// Shared AWS configuration context for creating service clients.
///
/// Built once per run and handed to every collector. It is never mutated
/// after construction; clones share the same `Arc`'d SDK config.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::connect(&config.aws).await?;
///
/// let sqs = SqsClient::from_context(&aws);
/// let s3 = S3Client::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
    profile: Option<String>,
    caller: Option<CallerIdentity>,
}

impl AwsContext {
    /// Load AWS configuration for the given region and optional profile.
    ///
    /// This resolves credentials lazily; nothing is validated yet.
    pub async fn load(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
            profile: profile.map(str::to_string),
            caller: None,
        }
    }

    /// Load configuration and validate the credentials against STS.
    ///
    /// Bad credentials or an unknown profile fail here, before any
    /// collector runs.
    pub async fn connect(aws: &AwsConfig) -> Result<Self> {
        let mut ctx = Self::load(&aws.region, aws.profile.as_deref()).await;
        if aws.verify_identity {
            ctx.caller = Some(verify_caller(ctx.sdk_config()).await?);
        }
        info!(
            region = %ctx.region,
            profile = ctx.profile.as_deref().unwrap_or("<default chain>"),
            account_id = ctx.account_id().map(|a| a.as_str()).unwrap_or("<unverified>"),
            "AWS context ready"
        );
        Ok(ctx)
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Profile name, if one was selected explicitly
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Account ID confirmed by STS, if the identity check ran
    /// Verified caller, when `connect` checked the credentials
    pub fn caller(&self) -> Option<&CallerIdentity> {
        self.caller.as_ref()
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        self.caller.as_ref().map(|c| &c.account)
    }

    pub fn sqs_client(&self) -> aws_sdk_sqs::Client {
        aws_sdk_sqs::Client::new(self.sdk_config())
    }

    pub fn sns_client(&self) -> aws_sdk_sns::Client {
        aws_sdk_sns::Client::new(self.sdk_config())
    }

    pub fn ssm_client(&self) -> aws_sdk_ssm::Client {
        aws_sdk_ssm::Client::new(self.sdk_config())
    }

    pub fn ses_client(&self) -> aws_sdk_ses::Client {
        aws_sdk_ses::Client::new(self.sdk_config())
    }

    pub fn ecs_client(&self) -> aws_sdk_ecs::Client {
        aws_sdk_ecs::Client::new(self.sdk_config())
    }

    pub fn kms_client(&self) -> aws_sdk_kms::Client {
        aws_sdk_kms::Client::new(self.sdk_config())
    }

    pub fn ecr_client(&self) -> aws_sdk_ecr::Client {
        aws_sdk_ecr::Client::new(self.sdk_config())
    }

    pub fn apigateway_client(&self) -> aws_sdk_apigateway::Client {
        aws_sdk_apigateway::Client::new(self.sdk_config())
    }

    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::new(self.sdk_config())
    }

    /// S3 client pinned to a specific region.
    ///
    /// Bucket-level calls must go to the bucket's own region.
    pub fn s3_client_in(&self, region: &str) -> aws_sdk_s3::Client {
        let conf = aws_sdk_s3::config::Builder::from(self.sdk_config())
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_s3::Client::from_conf(conf)
    }

    pub fn dynamodb_client(&self) -> aws_sdk_dynamodb::Client {
        aws_sdk_dynamodb::Client::new(self.sdk_config())
    }

    pub fn kinesis_client(&self) -> aws_sdk_kinesis::Client {
        aws_sdk_kinesis::Client::new(self.sdk_config())
    }

    pub fn firehose_client(&self) -> aws_sdk_firehose::Client {
        aws_sdk_firehose::Client::new(self.sdk_config())
    }
}

/// Trait for types that can be constructed from an [`AwsContext`].
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .field("profile", &self.profile)
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}
