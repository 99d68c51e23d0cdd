//! SSM Parameter Store metadata listing
//!
//! Only parameter metadata is read; values are never fetched.

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use super::to_utc;
use aws_sdk_ssm::Client;
use chrono::{DateTime, Utc};
use std::future::Future;

/// DescribeParameters page size (service maximum)
const DESCRIBE_PARAMETERS_PAGE_SIZE: i32 = 50;

/// Parameter metadata as listed
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    /// `String`, `StringList` or `SecureString`
    pub parameter_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Parameter store operations
pub trait ParameterApi: Send + Sync {
    fn describe_parameters(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<ParameterInfo>, AwsError>> + Send;
}

/// SSM client
pub struct SsmClient {
    client: Client,
}

impl FromAwsContext for SsmClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ssm_client(),
        }
    }
}

impl ParameterApi for SsmClient {
    async fn describe_parameters(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<ParameterInfo>, AwsError> {
        let response = self
            .client
            .describe_parameters()
            .max_results(DESCRIBE_PARAMETERS_PAGE_SIZE)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let parameters = response
            .parameters()
            .iter()
            .filter_map(|p| {
                Some(ParameterInfo {
                    name: p.name()?.to_string(),
                    parameter_type: p.r#type().map(|t| t.as_str().to_string()),
                    last_modified: p.last_modified_date().and_then(to_utc),
                })
            })
            .collect();
        Ok(Page::new(parameters, response.next_token()))
    }
}
