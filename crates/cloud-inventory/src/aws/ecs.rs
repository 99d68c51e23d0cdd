//! ECS clusters, services and task definitions

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_ecs::Client;
use std::future::Future;

/// DescribeServices accepts at most this many services per call
pub const DESCRIBE_SERVICES_BATCH: usize = 10;

/// A described ECS service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    pub arn: String,
    pub name: String,
    /// Full task definition ARN
    pub task_definition: Option<String>,
}

/// Result of one DescribeServices call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescribedServices {
    pub services: Vec<ServiceInfo>,
    /// `(arn, reason)` for services the call could not describe
    pub failures: Vec<(String, String)>,
}

/// Container service operations
pub trait ContainerServiceApi: Send + Sync {
    /// One page of cluster ARNs
    fn list_clusters(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;

    /// One page of service ARNs in a cluster
    fn list_services(
        &self,
        cluster: &str,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;

    /// Describe up to [`DESCRIBE_SERVICES_BATCH`] services
    fn describe_services(
        &self,
        cluster: &str,
        service_arns: &[String],
    ) -> impl Future<Output = Result<DescribedServices, AwsError>> + Send;

    /// Image of the first container in a task definition, `None` when the
    /// task definition has no containers
    fn primary_container_image(
        &self,
        task_definition: &str,
    ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send;
}

/// ECS client
pub struct EcsClient {
    client: Client,
}

impl FromAwsContext for EcsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ecs_client(),
        }
    }
}

impl ContainerServiceApi for EcsClient {
    async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_clusters()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(Page::new(
            response.cluster_arns().to_vec(),
            response.next_token(),
        ))
    }

    async fn list_services(
        &self,
        cluster: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_services()
            .cluster(cluster)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(Page::new(
            response.service_arns().to_vec(),
            response.next_token(),
        ))
    }

    async fn describe_services(
        &self,
        cluster: &str,
        service_arns: &[String],
    ) -> Result<DescribedServices, AwsError> {
        let response = self
            .client
            .describe_services()
            .cluster(cluster)
            .set_services(Some(service_arns.to_vec()))
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let services = response
            .services()
            .iter()
            .filter_map(|s| {
                let arn = s.service_arn()?.to_string();
                let name = s
                    .service_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| cloud_inventory_common::short_name(&arn).to_string());
                Some(ServiceInfo {
                    arn,
                    name,
                    task_definition: s.task_definition().map(str::to_string),
                })
            })
            .collect();

        let failures = response
            .failures()
            .iter()
            .map(|f| {
                (
                    f.arn().unwrap_or_default().to_string(),
                    f.reason().unwrap_or("unknown").to_string(),
                )
            })
            .collect();

        Ok(DescribedServices { services, failures })
    }

    async fn primary_container_image(
        &self,
        task_definition: &str,
    ) -> Result<Option<String>, AwsError> {
        let response = self
            .client
            .describe_task_definition()
            .task_definition(task_definition)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(response
            .task_definition()
            .and_then(|td| td.container_definitions().first())
            .and_then(|c| c.image())
            .map(str::to_string))
    }
}
