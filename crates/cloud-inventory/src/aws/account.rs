//! Caller identity check against STS

use anyhow::{Context, Result};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a 12-digit AWS account ID")]
pub struct InvalidAccountId(String);

/// Twelve-digit AWS account ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 12 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(AccountId(s.to_string()))
        } else {
            Err(InvalidAccountId(s.to_string()))
        }
    }
}

/// The principal the run's credentials resolve to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: AccountId,
    pub arn: Option<String>,
}

impl CallerIdentity {
    /// Resource part of the ARN, e.g. `assumed-role/ReadOnly/alice`
    pub fn principal(&self) -> Option<&str> {
        self.arn
            .as_deref()
            .and_then(|arn| arn.splitn(6, ':').nth(5))
            .filter(|p| !p.is_empty())
    }
}

/// Resolve the caller via STS GetCallerIdentity.
///
/// Needs no IAM permission, so any failure here means the credentials
/// themselves are bad: unknown profile, expired session, or none at all.
pub async fn verify_caller(config: &aws_config::SdkConfig) -> Result<CallerIdentity> {
    let sts = aws_sdk_sts::Client::new(config);
    let identity = sts
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials and profile")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?
        .parse::<AccountId>()?;

    let caller = CallerIdentity {
        account,
        arn: identity.arn().map(str::to_string),
    };
    info!(
        account_id = %caller.account,
        principal = caller.principal().unwrap_or("<unknown>"),
        "Credentials verified"
    );
    Ok(caller)
}
