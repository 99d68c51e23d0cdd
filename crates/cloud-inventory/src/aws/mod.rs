//! AWS client modules
//!
//! One module per inventoried service. Each defines a small `*Api` trait
//! returning plain domain structs (so collectors can be tested against
//! scripted fakes) and an SDK-backed client implementing it:
//! - SQS, SNS, SSM, SES: flat listings
//! - ECS, ECR, API Gateway: nested listings with per-item lookups
//! - KMS: keys and aliases
//! - S3: bucket listing plus region-pinned configuration lookups
//! - DynamoDB: tables
//! - Kinesis, Firehose: stream listings with a describe call per stream
//! - STS: caller identity check

pub mod account;
pub mod apigateway;
pub mod context;
pub mod dynamodb;
pub mod ecr;
pub mod ecs;
pub mod error;
pub mod firehose;
pub mod kinesis;
pub mod kms;
pub mod pagination;
pub mod s3;
pub mod ses;
pub mod sns;
pub mod sqs;
pub mod ssm;

pub use account::{AccountId, CallerIdentity, InvalidAccountId, verify_caller};
pub use context::{AwsContext, FromAwsContext};
pub use error::{AwsError, classify_aws_error};
pub use pagination::{Drained, Page, PaginationError, PagingPolicy, RetryPolicy, drain, retrying};

pub use apigateway::ApiGatewayClient;
pub use dynamodb::DynamoDbClient;
pub use ecr::EcrClient;
pub use ecs::EcsClient;
pub use firehose::FirehoseClient;
pub use kinesis::KinesisClient;
pub use kms::KmsClient;
pub use s3::S3Client;
pub use ses::SesClient;
pub use sns::SnsClient;
pub use sqs::SqsClient;
pub use ssm::SsmClient;

use chrono::{DateTime, Utc};

/// Convert an SDK timestamp. Out-of-range values yield `None`.
pub(crate) fn to_utc(dt: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}
