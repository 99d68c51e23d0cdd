//! API Gateway (REST) APIs, resources, methods and integrations

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_apigateway::Client;
use std::future::Future;

/// Page size for every API Gateway listing (service maximum)
const PAGE_LIMIT: i32 = 500;

/// A usage plan and the APIs it has stages on
#[derive(Debug, Clone, PartialEq)]
pub struct UsagePlanInfo {
    pub name: String,
    pub api_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestApiInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizerInfo {
    pub id: String,
    pub name: String,
}

/// A resource path and the HTTP methods defined on it
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInfo {
    pub id: String,
    pub path: String,
    /// Sorted
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodInfo {
    pub authorization_type: Option<String>,
    pub authorizer_id: Option<String>,
    pub api_key_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationInfo {
    /// `AWS`, `AWS_PROXY`, `HTTP`, `HTTP_PROXY` or `MOCK`
    pub integration_type: Option<String>,
    pub uri: Option<String>,
    /// `INTERNET` or `VPC_LINK`
    pub connection_type: Option<String>,
    pub connection_id: Option<String>,
}

/// REST API Gateway operations
pub trait GatewayApi: Send + Sync {
    fn get_usage_plans(
        &self,
        position: Option<String>,
    ) -> impl Future<Output = Result<Page<UsagePlanInfo>, AwsError>> + Send;

    fn get_rest_apis(
        &self,
        position: Option<String>,
    ) -> impl Future<Output = Result<Page<RestApiInfo>, AwsError>> + Send;

    fn get_authorizers(
        &self,
        api_id: &str,
        position: Option<String>,
    ) -> impl Future<Output = Result<Page<AuthorizerInfo>, AwsError>> + Send;

    fn get_resources(
        &self,
        api_id: &str,
        position: Option<String>,
    ) -> impl Future<Output = Result<Page<ResourceInfo>, AwsError>> + Send;

    fn get_method(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> impl Future<Output = Result<MethodInfo, AwsError>> + Send;

    fn get_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> impl Future<Output = Result<IntegrationInfo, AwsError>> + Send;
}

/// API Gateway client
pub struct ApiGatewayClient {
    client: Client,
}

impl FromAwsContext for ApiGatewayClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.apigateway_client(),
        }
    }
}

impl GatewayApi for ApiGatewayClient {
    async fn get_usage_plans(
        &self,
        position: Option<String>,
    ) -> Result<Page<UsagePlanInfo>, AwsError> {
        let response = self
            .client
            .get_usage_plans()
            .limit(PAGE_LIMIT)
            .set_position(position)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let plans = response
            .items()
            .iter()
            .map(|plan| UsagePlanInfo {
                name: plan.name().unwrap_or_default().to_string(),
                api_ids: plan
                    .api_stages()
                    .iter()
                    .filter_map(|stage| stage.api_id().map(str::to_string))
                    .collect(),
            })
            .collect();
        Ok(Page::new(plans, response.position()))
    }

    async fn get_rest_apis(&self, position: Option<String>) -> Result<Page<RestApiInfo>, AwsError> {
        let response = self
            .client
            .get_rest_apis()
            .limit(PAGE_LIMIT)
            .set_position(position)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let apis = response
            .items()
            .iter()
            .filter_map(|api| {
                let id = api.id()?.to_string();
                Some(RestApiInfo {
                    name: api.name().unwrap_or(&id).to_string(),
                    id,
                })
            })
            .collect();
        Ok(Page::new(apis, response.position()))
    }

    async fn get_authorizers(
        &self,
        api_id: &str,
        position: Option<String>,
    ) -> Result<Page<AuthorizerInfo>, AwsError> {
        let response = self
            .client
            .get_authorizers()
            .rest_api_id(api_id)
            .limit(PAGE_LIMIT)
            .set_position(position)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let authorizers = response
            .items()
            .iter()
            .filter_map(|a| {
                Some(AuthorizerInfo {
                    id: a.id()?.to_string(),
                    name: a.name().unwrap_or_default().to_string(),
                })
            })
            .collect();
        Ok(Page::new(authorizers, response.position()))
    }

    async fn get_resources(
        &self,
        api_id: &str,
        position: Option<String>,
    ) -> Result<Page<ResourceInfo>, AwsError> {
        let response = self
            .client
            .get_resources()
            .rest_api_id(api_id)
            .limit(PAGE_LIMIT)
            .set_position(position)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let resources = response
            .items()
            .iter()
            .filter_map(|r| {
                let mut methods: Vec<String> = r
                    .resource_methods()
                    .map(|m| m.keys().cloned().collect())
                    .unwrap_or_default();
                methods.sort();
                Some(ResourceInfo {
                    id: r.id()?.to_string(),
                    path: r.path().unwrap_or("/").to_string(),
                    methods,
                })
            })
            .collect();
        Ok(Page::new(resources, response.position()))
    }

    async fn get_method(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<MethodInfo, AwsError> {
        let response = self
            .client
            .get_method()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(MethodInfo {
            authorization_type: response.authorization_type().map(str::to_string),
            authorizer_id: response.authorizer_id().map(str::to_string),
            api_key_required: response.api_key_required().unwrap_or(false),
        })
    }

    async fn get_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<IntegrationInfo, AwsError> {
        let response = self
            .client
            .get_integration()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(IntegrationInfo {
            integration_type: response.r#type().map(|t| t.as_str().to_string()),
            uri: response.uri().map(str::to_string),
            connection_type: response.connection_type().map(|c| c.as_str().to_string()),
            connection_id: response.connection_id().map(str::to_string),
        })
    }
}
