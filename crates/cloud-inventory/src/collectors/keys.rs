//! KMS keys joined with their aliases

use super::{Collector, primary_listing};
use crate::aws::kms::KeyApi;
use crate::aws::pagination::{PagingPolicy, drain};
use cloud_inventory_common::sentinel::{NONE, NOT_AVAILABLE};
use cloud_inventory_common::{CollectorReport, InventoryRow};
use futures::future::BoxFuture;
use std::collections::HashMap;
use tracing::{info, warn};

pub struct KeyCollector<A> {
    api: A,
    policy: PagingPolicy,
}

impl<A: KeyApi> KeyCollector<A> {
    pub fn new(api: A, policy: PagingPolicy) -> Self {
        Self { api, policy }
    }

    pub async fn run(&self) -> anyhow::Result<CollectorReport> {
        let mut report = CollectorReport::new();

        // Aliases are only decoration; keys are still listed without them.
        let aliases = drain("kms:list-aliases", &self.policy, |marker| {
            self.api.list_aliases(marker)
        })
        .await;
        if let Some(err) = &aliases.interrupted {
            warn!(error = %err, "Alias listing incomplete, some keys may show no aliases");
            report.warn("kms:list-aliases", err);
        }

        let mut by_key: HashMap<String, Vec<String>> = HashMap::new();
        for alias in aliases.items {
            if let Some(key_id) = alias.target_key_id {
                by_key.entry(key_id).or_default().push(alias.name);
            }
        }

        let drained = drain("kms:list-keys", &self.policy, |marker| {
            self.api.list_keys(marker)
        })
        .await;
        let keys = primary_listing(drained, "kms:list-keys", &mut report)?;

        for key in keys {
            let aliases = by_key
                .get(&key.key_id)
                .map(|names| names.join(", "))
                .unwrap_or_else(|| NONE.to_string());
            report.push(
                InventoryRow::new()
                    .with("KeyId", key.key_id.as_str())
                    .with("Aliases", aliases)
                    .with("KeyArn", key.key_arn.as_deref().unwrap_or(NOT_AVAILABLE)),
            );
        }

        info!(count = report.rows.len(), "Found KMS keys");
        Ok(report)
    }
}

impl<A: KeyApi> Collector for KeyCollector<A> {
    fn collect(&self) -> BoxFuture<'_, anyhow::Result<CollectorReport>> {
        Box::pin(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::error::AwsError;
    use crate::aws::kms::{AliasInfo, KeyInfo};
    use crate::aws::pagination::Page;
    use crate::testing::{ScriptedPages, access_denied, fast_policy};
    use std::future::Future;

    struct FakeKms {
        aliases: ScriptedPages<AliasInfo>,
        keys: ScriptedPages<KeyInfo>,
    }

    impl KeyApi for FakeKms {
        fn list_aliases(
            &self,
            marker: Option<String>,
        ) -> impl Future<Output = Result<Page<AliasInfo>, AwsError>> + Send {
            self.aliases.next(marker)
        }

        fn list_keys(
            &self,
            marker: Option<String>,
        ) -> impl Future<Output = Result<Page<KeyInfo>, AwsError>> + Send {
            self.keys.next(marker)
        }
    }

    fn alias(name: &str, target: Option<&str>) -> AliasInfo {
        AliasInfo {
            name: name.to_string(),
            target_key_id: target.map(str::to_string),
        }
    }

    fn key(id: &str) -> KeyInfo {
        KeyInfo {
            key_id: id.to_string(),
            key_arn: Some(format!("arn:aws:kms:us-east-1:123456789012:key/{id}")),
        }
    }

    #[tokio::test]
    async fn test_aliases_joined_per_key() {
        let api = FakeKms {
            aliases: ScriptedPages::new(vec![
                Ok(Page::new(vec![alias("alias/orders", Some("k1"))], Some("m1"))),
                Ok(Page::last(vec![
                    alias("alias/orders-legacy", Some("k1")),
                    alias("alias/aws/unused", None),
                ])),
            ]),
            keys: ScriptedPages::single(vec![key("k1"), key("k2")]),
        };
        let report = KeyCollector::new(api, fast_policy()).run().await.unwrap();

        assert!(report.is_clean());
        assert_eq!(report.rows.len(), 2);
        assert_eq!(
            report.rows[0].text("Aliases"),
            Some("alias/orders, alias/orders-legacy")
        );
        assert_eq!(report.rows[1].text("Aliases"), Some(NONE));
        assert_eq!(
            report.rows[1].text("KeyArn"),
            Some("arn:aws:kms:us-east-1:123456789012:key/k2")
        );
    }

    #[tokio::test]
    async fn test_alias_failure_still_lists_keys() {
        let api = FakeKms {
            aliases: ScriptedPages::failing(access_denied()),
            keys: ScriptedPages::single(vec![key("k1")]),
        };
        let report = KeyCollector::new(api, fast_policy()).run().await.unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].text("Aliases"), Some(NONE));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].scope, "kms:list-aliases");
    }
}
