//! SES identities (email addresses, then domains)

use super::{Collector, primary_listing};
use crate::aws::pagination::{PagingPolicy, drain};
use crate::aws::ses::{IdentityApi, IdentityKind};
use cloud_inventory_common::{CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use tracing::{info, warn};

pub struct IdentityCollector<A> {
    api: A,
    policy: PagingPolicy,
}

impl<A: IdentityApi> IdentityCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();
        let mut failures = Vec::new();

        for kind in IdentityKind::ALL {
            let scope = format!("ses:list-identities/{kind}");
            let drained = drain(&scope, &self.policy, |token| {
                self.api.list_identities(kind, token)
            })
            .await;
            let identities = match primary_listing(drained, &scope, &mut report) {
                Ok(identities) => identities,
                Err(e) => {
                    failures.push((scope, e));
                    continue;
                }
            };

            for identity in identities {
                report.push(
                    InventoryRow::new()
                        .with("Type", kind.label())
                        .with("Identity", identity),
                );
            }
        }

        // Only an error when no identity kind could be listed at all
        if failures.len() == IdentityKind::ALL.len() {
            let (_, first) = failures.swap_remove(0);
            return Err(first);
        }
        for (scope, e) in failures {
            warn!(scope = %scope, error = %format!("{e:#}"), "Identity listing failed, keeping the rest");
            report.warn(scope, format!("{e:#}"));
        }

        info!(count = report.rows.len(), "Found SES identities");
        Ok(report)
    }
}

impl<A: IdentityApi> Collector for IdentityCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::error::AwsError;
    use crate::aws::pagination::Page;
    use crate::testing::{ScriptedPages, access_denied, fast_policy, service_error};
    use std::future::Future;

    struct FakeSes {
        emails: ScriptedPages<String>,
        domains: ScriptedPages<String>,
    }

    impl IdentityApi for FakeSes {
        fn list_identities(
            &self,
            kind: IdentityKind,
            next_token: Option<String>,
        ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send {
            match kind {
                IdentityKind::Email => self.emails.next(next_token),
                IdentityKind::Domain => self.domains.next(next_token),
            }
        }
    }

    #[tokio::test]
    async fn test_emails_then_domains() {
        let api = FakeSes {
            emails: ScriptedPages::new(vec![
                Ok(Page::new(vec!["ops@example.com".to_string()], Some("e1"))),
                Ok(Page::last(vec!["noreply@example.com".to_string()])),
            ]),
            domains: ScriptedPages::single(vec!["example.com".to_string()]),
        };
        let report = IdentityCollector::new(api, fast_policy()).run().await.unwrap();

        let rows: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.text("Type").unwrap(), r.text("Identity").unwrap()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Email", "ops@example.com"),
                ("Email", "noreply@example.com"),
                ("Domain", "example.com"),
            ]
        );
    }

    #[tokio::test]
    async fn test_domain_failure_keeps_emails() {
        let api = FakeSes {
            emails: ScriptedPages::single(vec!["ops@example.com".to_string()]),
            domains: ScriptedPages::failing(access_denied()),
        };
        let report = IdentityCollector::new(api, fast_policy()).run().await.unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].text("Type"), Some("Email"));
        assert_eq!(report.rows[0].text("Identity"), Some("ops@example.com"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].scope.contains("Domain"), "{:?}", report.warnings);
        assert!(report.warnings[0].message.contains("listing failed"), "{:?}", report.warnings);
    }

    #[tokio::test]
    async fn test_fails_when_no_kind_listed() {
        let api = FakeSes {
            emails: ScriptedPages::failing(access_denied()),
            domains: ScriptedPages::failing(service_error("InternalFailure")),
        };
        let err = IdentityCollector::new(api, fast_policy()).run().await.unwrap_err();

        assert!(format!("{err:#}").contains("Email"), "{err:#}");
    }
}
