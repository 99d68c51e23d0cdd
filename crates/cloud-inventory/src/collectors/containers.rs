//! ECS services and the image each one runs
//!
//! Clusters → services → DescribeServices in batches → task definition.
//! Task definitions are shared between services, so their images are
//! looked up once per run.

use super::{Collector, child_listing, primary_listing, record_failure};
use crate::aws::ecs::{ContainerServiceApi, DESCRIBE_SERVICES_BATCH};
use crate::aws::pagination::{PagingPolicy, drain, retrying};
use cloud_inventory_common::sentinel::{
    IMAGE_LOOKUP_FAILED, IMAGE_NOT_FOUND, NO_SERVICES, NOT_AVAILABLE,
};
use cloud_inventory_common::{CollectorReport, InventoryRow, short_name};
use futures::future::BoxFuture;
use std::collections::HashMap;
use tracing::{info, warn};

pub struct ContainerCollector<A> {
    api: A,
    policy: PagingPolicy,
}

fn service_row(cluster: &str, service: &str, task_definition: &str, image: &str) -> InventoryRow {
    InventoryRow::new()
        .with("Cluster", cluster)
        .with("Service", service)
        .with("TaskDefinition", task_definition)
        .with("ContainerImage", image)
}

impl<A: ContainerServiceApi> ContainerCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();
        let mut images: HashMap<String, String> = HashMap::new();

        let drained = drain("ecs:list-clusters", &self.policy, |token| {
            self.api.list_clusters(token)
        })
        .await;
        let clusters = primary_listing(drained, "ecs:list-clusters", &mut report)?;

        for cluster_arn in &clusters {
            self.collect_cluster(cluster_arn, &mut images, &mut report)
                .await;
        }

        info!(
            clusters = clusters.len(),
            rows = report.rows.len(),
            task_definitions = images.len(),
            "Found ECS services"
        );
        Ok(report)
    }

    async fn collect_cluster(
        &self,
        cluster_arn: &str,
        images: &mut HashMap<String, String>,
        report: &mut CollectorReport,
    ) {
        let cluster = short_name(cluster_arn);
        let scope = format!("ecs:cluster/{cluster}");

        let drained = drain(&scope, &self.policy, |token| {
            self.api.list_services(cluster_arn, token)
        })
        .await;

        let services = match child_listing(drained, &scope, report) {
            None => {
                report.push(service_row(cluster, NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE));
                return;
            }
            Some(services) if services.is_empty() => {
                report.push(service_row(cluster, NO_SERVICES, NO_SERVICES, NO_SERVICES));
                return;
            }
            Some(services) => services,
        };

        for batch in services.chunks(DESCRIBE_SERVICES_BATCH) {
            let described = retrying(&scope, &self.policy.retry, || {
                self.api.describe_services(cluster_arn, batch)
            })
            .await;

            let described = match described {
                Ok(described) => described,
                Err(e) => {
                    record_failure(report, &format!("{scope}/describe-services"), &e);
                    for arn in batch {
                        report.push(service_row(
                            cluster,
                            short_name(arn),
                            NOT_AVAILABLE,
                            NOT_AVAILABLE,
                        ));
                    }
                    continue;
                }
            };

            for (arn, reason) in &described.failures {
                let service = short_name(arn);
                warn!(cluster, service, reason = %reason, "Service could not be described");
                report.warn(format!("{scope}/service/{service}"), reason);
                report.push(service_row(cluster, service, NOT_AVAILABLE, NOT_AVAILABLE));
            }

            for service in &described.services {
                let row = match &service.task_definition {
                    Some(td) => {
                        let image = self.image_for(td, &scope, images, report).await;
                        service_row(cluster, &service.name, short_name(td), &image)
                    }
                    None => service_row(cluster, &service.name, NOT_AVAILABLE, NOT_AVAILABLE),
                };
                report.push(row);
            }
        }
    }

    /// Image of a task definition's first container, memoized per run.
    async fn image_for(
        &self,
        task_definition: &str,
        scope: &str,
        images: &mut HashMap<String, String>,
        report: &mut CollectorReport,
    ) -> String {
        if let Some(image) = images.get(task_definition) {
            return image.clone();
        }

        let looked_up = retrying(scope, &self.policy.retry, || {
            self.api.primary_container_image(task_definition)
        })
        .await;

        let image = match looked_up {
            Ok(Some(image)) => image,
            Ok(None) => IMAGE_NOT_FOUND.to_string(),
            Err(e) => {
                let td = short_name(task_definition);
                record_failure(report, &format!("{scope}/task-definition/{td}"), &e);
                IMAGE_LOOKUP_FAILED.to_string()
            }
        };
        images.insert(task_definition.to_string(), image.clone());
        image
    }
}

impl<A: ContainerServiceApi> Collector for ContainerCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::ecs::{DescribedServices, ServiceInfo};
    use crate::aws::error::AwsError;
    use crate::aws::pagination::Page;
    use crate::testing::{access_denied, fast_policy, service_error};
    use std::future::{Future, ready};
    use std::sync::Mutex;

    const CLUSTER: &str = "arn:aws:ecs:us-east-1:123456789012:cluster/prod";
    const TD_WEB: &str = "arn:aws:ecs:us-east-1:123456789012:task-definition/web:42";

    #[derive(Default)]
    struct FakeEcs {
        clusters: Vec<String>,
        services: HashMap<String, Vec<String>>,
        failing_service_listing: bool,
        failing_describe: bool,
        task_definitions: HashMap<String, String>,
        images: HashMap<String, Option<String>>,
        describe_batches: Mutex<Vec<usize>>,
        image_lookups: Mutex<Vec<String>>,
    }

    impl ContainerServiceApi for FakeEcs {
        fn list_clusters(
            &self,
            _next_token: Option<String>,
        ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send {
            ready(Ok(Page::last(self.clusters.clone())))
        }

        fn list_services(
            &self,
            cluster: &str,
            _next_token: Option<String>,
        ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send {
            ready(if self.failing_service_listing {
                Err(access_denied())
            } else {
                Ok(Page::last(
                    self.services.get(cluster).cloned().unwrap_or_default(),
                ))
            })
        }

        fn describe_services(
            &self,
            _cluster: &str,
            service_arns: &[String],
        ) -> impl Future<Output = Result<DescribedServices, AwsError>> + Send {
            self.describe_batches.lock().unwrap().push(service_arns.len());
            if self.failing_describe {
                return ready(Err(service_error("describe failed")));
            }
            let services = service_arns
                .iter()
                .map(|arn| ServiceInfo {
                    arn: arn.clone(),
                    name: short_name(arn).to_string(),
                    task_definition: self.task_definitions.get(arn).cloned(),
                })
                .collect();
            ready(Ok(DescribedServices {
                services,
                failures: vec![],
            }))
        }

        fn primary_container_image(
            &self,
            task_definition: &str,
        ) -> impl Future<Output = Result<Option<String>, AwsError>> + Send {
            self.image_lookups
                .lock()
                .unwrap()
                .push(task_definition.to_string());
            ready(match self.images.get(task_definition) {
                Some(image) => Ok(image.clone()),
                None => Err(access_denied()),
            })
        }
    }

    fn service_arn(name: &str) -> String {
        format!("arn:aws:ecs:us-east-1:123456789012:service/prod/{name}")
    }

    #[tokio::test]
    async fn test_cluster_without_services_gets_placeholder_row() {
        let api = FakeEcs {
            clusters: vec![CLUSTER.to_string()],
            ..FakeEcs::default()
        };
        let report = ContainerCollector::new(api, fast_policy()).run().await.unwrap();

        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.text("Cluster"), Some("prod"));
        assert_eq!(row.text("Service"), Some(NO_SERVICES));
        assert_eq!(row.text("TaskDefinition"), Some(NO_SERVICES));
        assert_eq!(row.text("ContainerImage"), Some(NO_SERVICES));
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_services_batched_and_images_cached() {
        let arns: Vec<String> = (0..12).map(|i| service_arn(&format!("svc-{i:02}"))).collect();
        let api = FakeEcs {
            clusters: vec![CLUSTER.to_string()],
            services: HashMap::from([(CLUSTER.to_string(), arns.clone())]),
            task_definitions: arns.iter().map(|a| (a.clone(), TD_WEB.to_string())).collect(),
            images: HashMap::from([(
                TD_WEB.to_string(),
                Some("123456789012.dkr.ecr.us-east-1.amazonaws.com/web:1.4.0".to_string()),
            )]),
            ..FakeEcs::default()
        };
        let collector = ContainerCollector::new(api, fast_policy());
        let report = collector.run().await.unwrap();

        assert_eq!(report.rows.len(), 12);
        assert_eq!(*collector.api.describe_batches.lock().unwrap(), vec![10, 2]);
        assert_eq!(collector.api.image_lookups.lock().unwrap().len(), 1);
        assert_eq!(report.rows[0].text("Service"), Some("svc-00"));
        assert_eq!(report.rows[0].text("TaskDefinition"), Some("web:42"));
        assert_eq!(
            report.rows[11].text("ContainerImage"),
            Some("123456789012.dkr.ecr.us-east-1.amazonaws.com/web:1.4.0")
        );
    }

    #[tokio::test]
    async fn test_image_sentinels() {
        let td_empty = "arn:aws:ecs:us-east-1:123456789012:task-definition/empty:1";
        let td_denied = "arn:aws:ecs:us-east-1:123456789012:task-definition/secret:3";
        let (a, b, c) = (service_arn("a"), service_arn("b"), service_arn("c"));
        let api = FakeEcs {
            clusters: vec![CLUSTER.to_string()],
            services: HashMap::from([(CLUSTER.to_string(), vec![a.clone(), b.clone(), c.clone()])]),
            task_definitions: HashMap::from([
                (a.clone(), td_empty.to_string()),
                (b.clone(), td_denied.to_string()),
            ]),
            images: HashMap::from([(td_empty.to_string(), None)]),
            ..FakeEcs::default()
        };
        let report = ContainerCollector::new(api, fast_policy()).run().await.unwrap();

        assert_eq!(report.rows[0].text("ContainerImage"), Some(IMAGE_NOT_FOUND));
        assert_eq!(report.rows[1].text("ContainerImage"), Some(IMAGE_LOOKUP_FAILED));
        assert_eq!(report.rows[1].text("TaskDefinition"), Some("secret:3"));
        assert_eq!(report.rows[2].text("TaskDefinition"), Some(NOT_AVAILABLE));
        assert_eq!(report.rows[2].text("ContainerImage"), Some(NOT_AVAILABLE));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].scope.ends_with("task-definition/secret:3"));
    }

    #[tokio::test]
    async fn test_service_listing_failure_keeps_cluster_row() {
        let api = FakeEcs {
            clusters: vec![CLUSTER.to_string()],
            failing_service_listing: true,
            ..FakeEcs::default()
        };
        let report = ContainerCollector::new(api, fast_policy()).run().await.unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].text("Cluster"), Some("prod"));
        assert_eq!(report.rows[0].text("Service"), Some(NOT_AVAILABLE));
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_describe_failure_keeps_service_rows() {
        let api = FakeEcs {
            clusters: vec![CLUSTER.to_string()],
            services: HashMap::from([(
                CLUSTER.to_string(),
                vec![service_arn("a"), service_arn("b")],
            )]),
            failing_describe: true,
            ..FakeEcs::default()
        };
        let report = ContainerCollector::new(api, fast_policy()).run().await.unwrap();

        let services: Vec<_> = report.rows.iter().map(|r| r.text("Service").unwrap()).collect();
        assert_eq!(services, vec!["a", "b"]);
        assert_eq!(report.rows[0].text("TaskDefinition"), Some(NOT_AVAILABLE));
        assert_eq!(report.warnings.len(), 1);
    }
}
