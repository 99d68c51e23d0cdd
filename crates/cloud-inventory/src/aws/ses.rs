//! SES identity listing

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_ses::Client;
use aws_sdk_ses::types::IdentityType;
use std::fmt;
use std::future::Future;

/// Kind of verified identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Email,
    Domain,
}

impl IdentityKind {
    /// Listing order in the report
    pub const ALL: [IdentityKind; 2] = [IdentityKind::Email, IdentityKind::Domain];

    pub fn label(self) -> &'static str {
        match self {
            IdentityKind::Email => "Email",
            IdentityKind::Domain => "Domain",
        }
    }

    fn sdk_type(self) -> IdentityType {
        match self {
            IdentityKind::Email => IdentityType::EmailAddress,
            IdentityKind::Domain => IdentityType::Domain,
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity listing operations
pub trait IdentityApi: Send + Sync {
    /// One page of identities of the given kind
    fn list_identities(
        &self,
        kind: IdentityKind,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;
}

/// SES client
pub struct SesClient {
    client: Client,
}

impl FromAwsContext for SesClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ses_client(),
        }
    }
}

impl IdentityApi for SesClient {
    async fn list_identities(
        &self,
        kind: IdentityKind,
        next_token: Option<String>,
    ) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_identities()
            .identity_type(kind.sdk_type())
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        Ok(Page::new(
            response.identities().to_vec(),
            response.next_token(),
        ))
    }
}
