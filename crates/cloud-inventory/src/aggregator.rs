//! Fan-out collection into a single report bundle
//!
//! Every registered collector is polled concurrently on the current task.
//! Categories are independent; one failing does not cancel the others
//! unless [`FailurePolicy::FailFast`] is selected.

use crate::collectors::Collector;
use anyhow::Context;
use cloud_inventory_common::{BundleError, CollectionWarning, CollectorReport, ReportBundle};
use futures::future::{join_all, try_join_all};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// What happens when a collector returns an error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the category as failed with no rows and keep going
    #[default]
    Isolate,
    /// Abort the whole aggregation on the first collector error
    FailFast,
}

/// Whether categories without rows get a sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptySheetPolicy {
    #[default]
    Keep,
    Omit,
}

/// Per-category result shown to the operator
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub label: String,
    pub rows: usize,
    pub warnings: Vec<CollectionWarning>,
    /// Set when the collector failed outright
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl CategorySummary {
    pub fn status(&self) -> &'static str {
        match (&self.error, self.warnings.is_empty()) {
            (Some(_), _) => "failed",
            (None, true) => "ok",
            (None, false) => "partial",
        }
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct AggregationOutcome {
    pub bundle: ReportBundle,
    /// In registration order
    pub summaries: Vec<CategorySummary>,
}

impl AggregationOutcome {
    pub fn failed(&self) -> impl Iterator<Item = &CategorySummary> {
        self.summaries.iter().filter(|s| s.error.is_some())
    }

    pub fn total_warnings(&self) -> usize {
        self.summaries.iter().map(|s| s.warnings.len()).sum()
    }
}

/// Runs collectors and assembles their rows into a [`ReportBundle`].
#[derive(Default)]
pub struct Aggregator {
    collectors: Vec<(String, Box<dyn Collector>)>,
    failure_policy: FailurePolicy,
    empty_sheets: EmptySheetPolicy,
}

impl Aggregator {
    pub fn new(failure_policy: FailurePolicy, empty_sheets: EmptySheetPolicy) -> Self {
        Self {
            collectors: Vec::new(),
            failure_policy,
            empty_sheets,
        }
    }

    /// Register a collector under a unique label.
    pub fn register(
        &mut self,
        label: impl Into<String>,
        collector: Box<dyn Collector>,
    ) -> Result<(), BundleError> {
        let label = label.into();
        if self.collectors.iter().any(|(l, _)| *l == label) {
            return Err(BundleError::DuplicateCategory(label));
        }
        self.collectors.push((label, collector));
        Ok(())
    }

    /// Run every collector to completion.
    pub async fn run(&self) -> anyhow::Result<AggregationOutcome> {
        info!(categories = self.collectors.len(), "Collecting inventory");

        let timed = self.collectors.iter().map(|(label, collector)| async move {
            let started = Instant::now();
            let result = collector.collect().await;
            (label.as_str(), result, started.elapsed())
        });

        let results: Vec<(&str, anyhow::Result<CollectorReport>, Duration)> =
            match self.failure_policy {
                FailurePolicy::Isolate => join_all(timed).await,
                FailurePolicy::FailFast => {
                    try_join_all(timed.map(|f| async move {
                        let (label, result, elapsed) = f.await;
                        result
                            .with_context(|| format!("collecting {label} failed"))
                            .map(|report| (label, Ok(report), elapsed))
                    }))
                    .await?
                }
            };

        let mut bundle = ReportBundle::new();
        let mut summaries = Vec::with_capacity(results.len());

        for (label, result, elapsed) in results {
            let (report, failure) = match result {
                Ok(report) => (report, None),
                Err(e) => {
                    let message = format!("{e:#}");
                    error!(category = label, error = %message, "Category failed");
                    (CollectorReport::new(), Some(message))
                }
            };

            if failure.is_none() {
                info!(
                    category = label,
                    rows = report.rows.len(),
                    warnings = report.warnings.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Category collected"
                );
            }

            let rows = report.rows.len();
            if rows > 0 || self.empty_sheets == EmptySheetPolicy::Keep {
                bundle.insert(label, report.rows)?;
            }
            summaries.push(CategorySummary {
                label: label.to_string(),
                rows,
                warnings: report.warnings,
                error: failure,
                elapsed,
            });
        }

        Ok(AggregationOutcome { bundle, summaries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_inventory_common::InventoryRow;
    use futures::future::BoxFuture;

    enum Stub {
        Rows(usize),
        Fails(&'static str),
        Slow(Duration, usize),
    }

    impl Collector for Stub {
        fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
            Box::pin(async move {
                let rows = match self {
                    Stub::Rows(n) => *n,
                    Stub::Fails(msg) => anyhow::bail!("{msg}"),
                    Stub::Slow(delay, n) => {
                        tokio::time::sleep(*delay).await;
                        *n
                    }
                };
                let mut report = CollectorReport::new();
                for i in 0..rows {
                    report.push(InventoryRow::new().with("Id", i));
                }
                Ok(report)
            })
        }
    }

    fn aggregator(policy: FailurePolicy, empty: EmptySheetPolicy) -> Aggregator {
        let mut agg = Aggregator::new(policy, empty);
        agg.register("SQS", Box::new(Stub::Rows(2))).unwrap();
        agg.register("KMS_Keys", Box::new(Stub::Fails("AccessDenied"))).unwrap();
        agg.register("ECR", Box::new(Stub::Rows(0))).unwrap();
        agg
    }

    #[tokio::test]
    async fn test_isolate_keeps_other_categories() {
        let outcome = aggregator(FailurePolicy::Isolate, EmptySheetPolicy::Keep)
            .run()
            .await
            .unwrap();

        let labels: Vec<_> = outcome.bundle.labels().collect();
        assert_eq!(labels, vec!["SQS", "KMS_Keys", "ECR"]);
        assert_eq!(outcome.bundle.get("SQS").map(|r| r.len()), Some(2));
        assert_eq!(outcome.bundle.get("KMS_Keys").map(|r| r.len()), Some(0));

        let failed: Vec<_> = outcome.failed().map(|s| s.label.as_str()).collect();
        assert_eq!(failed, vec!["KMS_Keys"]);
        assert_eq!(outcome.summaries[1].status(), "failed");
        assert!(outcome.summaries[1].error.as_deref().unwrap().contains("AccessDenied"));
        assert_eq!(outcome.summaries[0].status(), "ok");
    }

    #[tokio::test]
    async fn test_fail_fast_rejects_everything() {
        let err = aggregator(FailurePolicy::FailFast, EmptySheetPolicy::Keep)
            .run()
            .await
            .unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("collecting KMS_Keys failed"), "{chain}");
        assert!(chain.contains("AccessDenied"), "{chain}");
    }

    #[tokio::test]
    async fn test_omit_drops_empty_and_failed_sheets() {
        let outcome = aggregator(FailurePolicy::Isolate, EmptySheetPolicy::Omit)
            .run()
            .await
            .unwrap();

        let labels: Vec<_> = outcome.bundle.labels().collect();
        assert_eq!(labels, vec!["SQS"]);
        // Omitted categories still show up in the summary
        assert_eq!(outcome.summaries.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_label_rejected() {
        let mut agg = Aggregator::default();
        agg.register("S3", Box::new(Stub::Rows(1))).unwrap();
        assert_eq!(
            agg.register("S3", Box::new(Stub::Rows(2))),
            Err(BundleError::DuplicateCategory("S3".to_string()))
        );

        // The first registration stands
        let outcome = agg.run().await.unwrap();
        assert_eq!(outcome.summaries.len(), 1);
        assert_eq!(outcome.bundle.total_rows(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collectors_run_concurrently() {
        let mut agg = Aggregator::default();
        agg.register("A", Box::new(Stub::Slow(Duration::from_secs(5), 1))).unwrap();
        agg.register("B", Box::new(Stub::Slow(Duration::from_secs(5), 1))).unwrap();

        let started = tokio::time::Instant::now();
        let outcome = agg.run().await.unwrap();

        assert_eq!(outcome.bundle.total_rows(), 2);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_partial_status() {
        struct Warns;
        impl Collector for Warns {
            fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
                Box::pin(async {
                    let mut report = CollectorReport::new();
                    report.warn("s3:bucket/a/policy", "AccessDenied");
                    anyhow::Ok(report)
                })
            }
        }

        let mut agg = Aggregator::default();
        agg.register("S3", Box::new(Warns)).unwrap();
        let outcome = agg.run().await.unwrap();

        assert_eq!(outcome.summaries[0].status(), "partial");
        assert_eq!(outcome.total_warnings(), 1);
    }
}
