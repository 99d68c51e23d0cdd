//! API Gateway REST endpoints
//!
//! One row per (API, resource path, HTTP method), describing who may call
//! it and where the integration sends the request.

use super::{Collector, child_listing, primary_listing, record_failure};
use crate::aws::apigateway::{GatewayApi, IntegrationInfo, MethodInfo, RestApiInfo, UsagePlanInfo};
use crate::aws::pagination::{PagingPolicy, drain, retrying};
use cloud_inventory_common::sentinel::{NONE, NOT_AVAILABLE};
use cloud_inventory_common::{CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const VPC_LINK: &str = "VPC_LINK";
const CUSTOM_AUTHORIZER: &str = "CUSTOM";
const NO_AUTHORIZATION: &str = "NONE";

/// Where an integration forwards requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub target_type: String,
    pub uri: String,
    pub vpc_link_id: String,
}

/// Summarize an integration's backend.
///
/// AWS service integrations carry an API Gateway ARN such as
/// `arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/{fn-arn}/invocations`:
/// the type is the service segment and the target is the function name for
/// Lambda, or the service path otherwise. HTTP integrations keep the full URI.
pub fn describe_target(integration: &IntegrationInfo) -> Target {
    let integration_type = integration
        .integration_type
        .as_deref()
        .unwrap_or(NOT_AVAILABLE);
    let via_vpc_link = integration.connection_type.as_deref() == Some(VPC_LINK);
    let vpc_link_id = match (via_vpc_link, integration.connection_id.as_deref()) {
        (true, Some(id)) => id.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    };

    let (target_type, uri) = match integration.uri.as_deref().filter(|u| !u.is_empty()) {
        None => (integration_type.to_string(), NOT_AVAILABLE.to_string()),
        Some(uri) if uri.starts_with("arn:") => {
            let segments: Vec<&str> = uri.splitn(6, ':').collect();
            match (segments.get(4), segments.get(5)) {
                (Some(service), Some(path)) => (service.to_string(), service_target(path)),
                _ => (integration_type.to_string(), uri.to_string()),
            }
        }
        Some(uri) => (integration_type.to_string(), uri.to_string()),
    };

    Target {
        target_type,
        uri: if via_vpc_link {
            NOT_AVAILABLE.to_string()
        } else {
            uri
        },
        vpc_link_id,
    }
}

/// `function:{name}` for Lambda invocations, the service path otherwise
fn service_target(path: &str) -> String {
    if let Some((_, function_arn)) = path.split_once("/functions/") {
        let function_arn = function_arn.trim_end_matches("/invocations");
        if let Some(idx) = function_arn.find("function:") {
            return function_arn[idx..].to_string();
        }
        return function_arn.to_string();
    }
    path.to_string()
}

/// What the Authorizer column shows for a method
fn authorizer_label(method: &MethodInfo, authorizers: &HashMap<String, String>) -> String {
    let kind = method
        .authorization_type
        .as_deref()
        .unwrap_or(NO_AUTHORIZATION);
    match (kind, method.authorizer_id.as_deref()) {
        (CUSTOM_AUTHORIZER, Some(id)) => authorizers.get(id).cloned().unwrap_or_else(|| id.to_string()),
        (kind, _) => kind.to_string(),
    }
}

/// Names of the usage plans with a stage on `api_id`
fn usage_plans_for(api_id: &str, plans: &[UsagePlanInfo]) -> String {
    let names: Vec<&str> = plans
        .iter()
        .filter(|p| p.api_ids.iter().any(|id| id == api_id))
        .map(|p| p.name.as_str())
        .collect();
    if names.is_empty() {
        NONE.to_string()
    } else {
        names.join(", ")
    }
}

pub struct GatewayCollector<A> {
    api: A,
    policy: PagingPolicy,
}

impl<A: GatewayApi> GatewayCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let plans = drain("apigateway:usage-plans", &self.policy, |position| {
            self.api.get_usage_plans(position)
        })
        .await;
        if let Some(err) = &plans.interrupted {
            warn!(error = %err, "Usage plan listing incomplete");
            report.warn("apigateway:usage-plans", err);
        }
        let plans = plans.items;

        let drained = drain("apigateway:rest-apis", &self.policy, |position| {
            self.api.get_rest_apis(position)
        })
        .await;
        let apis = primary_listing(drained, "apigateway:rest-apis", &mut report)?;

        for api in &apis {
            self.collect_api(api, &plans, &mut report).await;
        }

        info!(apis = apis.len(), count = report.rows.len(), "Found API Gateway methods");
        Ok(report)
    }

    async fn collect_api(&self, api: &RestApiInfo, plans: &[UsagePlanInfo], report: &mut CollectorReport) {
        let scope = format!("apigateway:api/{}", api.name);

        let authorizer_scope = format!("{scope}/authorizers");
        let drained = drain(&authorizer_scope, &self.policy, |position| {
            self.api.get_authorizers(&api.id, position)
        })
        .await;
        let authorizers: HashMap<String, String> = child_listing(drained, &authorizer_scope, report)
            .unwrap_or_default()
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect();

        let usage_plans = usage_plans_for(&api.id, plans);

        let resource_scope = format!("{scope}/resources");
        let drained = drain(&resource_scope, &self.policy, |position| {
            self.api.get_resources(&api.id, position)
        })
        .await;
        let Some(resources) = child_listing(drained, &resource_scope, report) else {
            return;
        };

        for resource in &resources {
            for http_method in &resource.methods {
                let method_scope = format!("{scope}/{http_method} {}", resource.path);

                let method = retrying(&method_scope, &self.policy.retry, || {
                    self.api.get_method(&api.id, &resource.id, http_method)
                })
                .await;
                let (authorizer, api_key_required) = match method {
                    Ok(method) => (
                        authorizer_label(&method, &authorizers),
                        if method.api_key_required { "Yes" } else { "No" }.to_string(),
                    ),
                    Err(e) if e.is_not_found() => {
                        debug!(scope = %method_scope, "Method vanished, skipping");
                        continue;
                    }
                    Err(e) => {
                        record_failure(report, &method_scope, &e);
                        (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
                    }
                };

                let integration = retrying(&method_scope, &self.policy.retry, || {
                    self.api.get_integration(&api.id, &resource.id, http_method)
                })
                .await;
                let target = match integration {
                    Ok(integration) => describe_target(&integration),
                    Err(e) if e.is_not_found() => {
                        debug!(scope = %method_scope, "Method has no integration, skipping");
                        continue;
                    }
                    Err(e) => {
                        record_failure(report, &format!("{method_scope}/integration"), &e);
                        Target {
                            target_type: NOT_AVAILABLE.to_string(),
                            uri: NOT_AVAILABLE.to_string(),
                            vpc_link_id: NOT_AVAILABLE.to_string(),
                        }
                    }
                };

                report.push(
                    InventoryRow::new()
                        .with("API Name", api.name.as_str())
                        .with("Method", http_method.as_str())
                        .with("Path", resource.path.as_str())
                        .with("Authorizer", authorizer)
                        .with("API Key Required", api_key_required)
                        .with("Target Type", target.target_type)
                        .with("Target URI", target.uri)
                        .with("VPC Link ID", target.vpc_link_id)
                        .with("Usage Plans", usage_plans.as_str()),
                );
            }
        }
    }
}

impl<A: GatewayApi> Collector for GatewayCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}
