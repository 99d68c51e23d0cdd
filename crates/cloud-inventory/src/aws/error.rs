//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use std::error::Error as StdError;
use thiserror::Error;

/// AWS error categories for collector degradation and retry logic
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AwsError {
    /// The optional thing asked for does not exist (no policy, no
    /// integration, ...). Expected during enrichment; never a warning.
    #[error("Not found ({code}): {message}")]
    NotFound { code: String, message: String },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded ({code})")]
    Throttled { code: String },

    /// Credentials lack permission or are no longer valid
    #[error("Access denied ({code}): {message}")]
    AccessDenied { code: String, message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Classify any SDK error (operation error or `SdkError` wrapper).
    pub fn from_sdk<E>(err: &E) -> Self
    where
        E: ProvideErrorMetadata + StdError,
    {
        let message = match err.message() {
            Some(m) => m.to_string(),
            None => error_chain(err),
        };
        classify_aws_error(err.code(), Some(&message))
    }

    /// Check if this is an expected-absence error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, AwsError::Throttled { .. })
    }

    /// Error code reported by the provider, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. }
            | AwsError::Throttled { code }
            | AwsError::AccessDenied { code, .. } => Some(code),
            AwsError::Sdk { code, .. } => code.as_deref(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        self.code().and_then(suggestion_for_code)
    }
}

/// Known AWS error codes meaning "this optional resource does not exist"
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucketPolicy",
    "ServerSideEncryptionConfigurationNotFoundError",
    "NoSuchPublicAccessBlockConfiguration",
    "NoSuchLifecycleConfiguration",
    "NoSuchBucket",
    "NoSuchEntity",
    "NotFoundException",
    "NotFound",
    "ResourceNotFoundException",
    "RepositoryNotFoundException",
    "ClusterNotFoundException",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "RequestThrottled",
    "RequestThrottledException",
    "SlowDown",
];

/// Known AWS error codes for permission and credential failures
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AuthorizationError",
    "UnauthorizedOperation",
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled {
            code: c.to_string(),
        },
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied {
            code: c.to_string(),
            message,
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Render an error and its sources as `outer: inner: root`.
///
/// `SdkError`'s own Display is only "service error"; the useful part is
/// further down the chain.
fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AccessDenied",
        "Grant the profile read access (List*/Describe*/Get*) for this service.",
    ),
    (
        "AccessDeniedException",
        "Grant the profile read access (List*/Describe*/Get*) for this service.",
    ),
    (
        "AuthorizationError",
        "Grant the profile read access (List*/Describe*/Get*) for this service.",
    ),
    (
        "UnauthorizedOperation",
        "Grant the profile read access (List*/Describe*/Get*) for this service.",
    ),
    (
        "ExpiredToken",
        "Session credentials expired. Refresh them (e.g. `aws sso login --profile <name>`).",
    ),
    (
        "ExpiredTokenException",
        "Session credentials expired. Refresh them (e.g. `aws sso login --profile <name>`).",
    ),
    (
        "InvalidClientTokenId",
        "The access key is not recognised. Check the selected profile.",
    ),
    (
        "UnrecognizedClientException",
        "The access key is not recognised. Check the selected profile.",
    ),
    (
        "PermanentRedirect",
        "The resource lives in another region than the one queried.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
}
