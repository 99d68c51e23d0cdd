//! Inventory categories
//!
//! Each category maps to one collector and one sheet in the report. The
//! sheet label is fixed here, not derived from the collector.

use std::fmt;
use std::str::FromStr;

/// Resource categories the tool can inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// SQS queues
    Sqs,
    /// SNS topics
    Sns,
    /// SSM parameters (metadata only, never values)
    Ssm,
    /// SES email and domain identities
    Ses,
    /// ECS clusters, services, and their primary container image
    Ecs,
    /// KMS keys joined with their aliases
    Kms,
    /// ECR images, one row per tag
    Ecr,
    /// API Gateway REST endpoints and their integrations
    ApiGateway,
    /// S3 buckets and their security configuration
    S3,
    /// DynamoDB tables
    DynamoDb,
    /// Kinesis data streams
    Kinesis,
    /// Firehose delivery streams, one row per destination
    Firehose,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Category; 12] = [
        Category::Sqs,
        Category::Sns,
        Category::Ssm,
        Category::Ses,
        Category::Ecs,
        Category::Kms,
        Category::Ecr,
        Category::ApiGateway,
        Category::S3,
        Category::DynamoDb,
        Category::Kinesis,
        Category::Firehose,
    ];

    /// Short name used on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sqs => "sqs",
            Category::Sns => "sns",
            Category::Ssm => "ssm",
            Category::Ses => "ses",
            Category::Ecs => "ecs",
            Category::Kms => "kms",
            Category::Ecr => "ecr",
            Category::ApiGateway => "apigateway",
            Category::S3 => "s3",
            Category::DynamoDb => "dynamodb",
            Category::Kinesis => "kinesis",
            Category::Firehose => "firehose",
        }
    }

    /// Sheet label in the report
    pub fn sheet_name(self) -> &'static str {
        match self {
            Category::Sqs => "SQS",
            Category::Sns => "SNS",
            Category::Ssm => "SSM_Parameters",
            Category::Ses => "SES_Identities",
            Category::Ecs => "ECS",
            Category::Kms => "KMS_Keys",
            Category::Ecr => "ECR",
            Category::ApiGateway => "API_Gateway",
            Category::S3 => "S3",
            Category::DynamoDb => "DynamoDB",
            Category::Kinesis => "Kinesis_Streams",
            Category::Firehose => "Firehose",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{s}' (expected one of: {})", valid.join(", "))
            })
    }
}
