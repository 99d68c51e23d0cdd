//! ECR images, one row per tag

use super::{Collector, child_listing, primary_listing};
use crate::aws::ecr::{ImageInfo, RepositoryApi};
use crate::aws::pagination::{PagingPolicy, drain};
use cloud_inventory_common::sentinel::NOT_AVAILABLE;
use cloud_inventory_common::{CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use tracing::{debug, info};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct ImageCollector<A> {
    api: A,
    policy: PagingPolicy,
}

/// Size in megabytes, rounded to two decimals
fn size_mb(bytes: Option<i64>) -> f64 {
    let mb = bytes.unwrap_or(0) as f64 / BYTES_PER_MB;
    (mb * 100.0).round() / 100.0
}

fn image_rows(repository: &str, image: &ImageInfo) -> impl Iterator<Item = InventoryRow> {
    let digest = image.digest.as_deref().unwrap_or(NOT_AVAILABLE);
    let pushed_at = image
        .pushed_at
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let size = size_mb(image.size_bytes);

    image.tags.iter().map(move |tag| {
        InventoryRow::new()
            .with("Repository Name", repository)
            .with("Image Tag", tag.as_str())
            .with("Image Digest", digest)
            .with("Pushed At", pushed_at.as_str())
            .with("Size (MB)", size)
    })
}

impl<A: RepositoryApi> ImageCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        let drained = drain("ecr:describe-repositories", &self.policy, |token| {
            self.api.describe_repositories(token)
        })
        .await;
        let repositories = primary_listing(drained, "ecr:describe-repositories", &mut report)?;

        for repository in &repositories {
            let scope = format!("ecr:repository/{repository}");
            let drained = drain(&scope, &self.policy, |token| {
                self.api.describe_images(repository, token)
            })
            .await;
            let Some(images) = child_listing(drained, &scope, &mut report) else {
                continue;
            };

            let untagged = images.iter().filter(|i| i.tags.is_empty()).count();
            if untagged > 0 {
                debug!(repository = %repository, untagged, "Skipping untagged images");
            }
            for image in &images {
                report.rows.extend(image_rows(repository, image));
            }
        }

        info!(
            repositories = repositories.len(),
            count = report.rows.len(),
            "Found ECR image tags"
        );
        Ok(report)
    }
}

impl<A: RepositoryApi> Collector for ImageCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::error::AwsError;
    use crate::aws::pagination::Page;
    use crate::testing::{ScriptedPages, fast_policy};
    use chrono::{TimeZone, Utc};
    use cloud_inventory_common::CellValue;
    use std::collections::HashMap;
    use std::future::Future;

    struct FakeEcr {
        repositories: ScriptedPages<String>,
        images: HashMap<String, ScriptedPages<ImageInfo>>,
    }

    impl RepositoryApi for FakeEcr {
        fn describe_repositories(
            &self,
            next_token: Option<String>,
        ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send {
            self.repositories.next(next_token)
        }

        fn describe_images(
            &self,
            repository: &str,
            next_token: Option<String>,
        ) -> impl Future<Output = Result<Page<ImageInfo>, AwsError>> + Send {
            self.images[repository].next(next_token)
        }
    }

    fn image(tags: &[&str], size_bytes: i64) -> ImageInfo {
        ImageInfo {
            digest: Some("sha256:0f3a".to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            pushed_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).single(),
            size_bytes: Some(size_bytes),
        }
    }

    #[tokio::test]
    async fn test_one_row_per_tag() {
        let api = FakeEcr {
            repositories: ScriptedPages::single(vec!["web".to_string()]),
            images: HashMap::from([(
                "web".to_string(),
                ScriptedPages::single(vec![image(&["latest", "1.4.0"], 52_428_800), image(&[], 10)]),
            )]),
        };
        let report = ImageCollector::new(api, fast_policy()).run().await.unwrap();

        assert_eq!(report.rows.len(), 2);
        let (a, b) = (&report.rows[0], &report.rows[1]);
        assert_eq!(a.text("Image Tag"), Some("latest"));
        assert_eq!(b.text("Image Tag"), Some("1.4.0"));
        for column in ["Repository Name", "Image Digest", "Pushed At", "Size (MB)"] {
            assert_eq!(a.get(column), b.get(column), "{column} differs");
        }
        assert_eq!(a.get("Size (MB)"), Some(&CellValue::Number(50.0)));
        assert_eq!(a.text("Pushed At"), Some("2024-06-01T08:30:00+00:00"));
    }

    #[tokio::test]
    async fn test_repository_failure_does_not_stop_others() {
        let api = FakeEcr {
            repositories: ScriptedPages::single(vec!["gone".to_string(), "api".to_string()]),
            images: HashMap::from([
                (
                    "gone".to_string(),
                    ScriptedPages::failing(crate::testing::not_found("RepositoryNotFoundException")),
                ),
                ("api".to_string(), ScriptedPages::single(vec![image(&["v2"], 1_500_000)])),
            ]),
        };
        let report = ImageCollector::new(api, fast_policy()).run().await.unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].text("Repository Name"), Some("api"));
        assert!(report.is_clean());
    }

    #[test]
    fn test_size_mb_rounding() {
        assert_eq!(size_mb(Some(1_500_000)), 1.43);
        assert_eq!(size_mb(None), 0.0);
    }
}
