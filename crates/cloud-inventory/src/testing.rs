//! Shared fixtures for unit tests.
//!
//! Collector tests drive fake API implementations built on [`ScriptedPages`],
//! which hands out pre-recorded pages in order and records every cursor it
//! was asked for.

use crate::aws::error::AwsError;
use crate::aws::pagination::{Page, PagingPolicy, RetryPolicy};
use std::collections::VecDeque;
use std::future::{Ready, ready};
use std::sync::Mutex;
use std::time::Duration;

/// Pre-recorded responses for one listing call
pub struct ScriptedPages<T> {
    script: Mutex<VecDeque<Result<Page<T>, AwsError>>>,
    requests: Mutex<Vec<Option<String>>>,
}

impl<T> ScriptedPages<T> {
    pub fn new(script: Vec<Result<Page<T>, AwsError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A listing that returns everything in a single page
    pub fn single(items: Vec<T>) -> Self {
        Self::new(vec![Ok(Page::last(items))])
    }

    /// A listing whose first request fails
    pub fn failing(err: AwsError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// Serve the next scripted response.
    ///
    /// Panics if the code under test asks for more pages than were scripted.
    pub fn next(&self, cursor: Option<String>) -> Ready<Result<Page<T>, AwsError>> {
        self.requests.lock().unwrap().push(cursor.clone());
        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted page left for cursor {cursor:?}"));
        ready(response)
    }

    /// Cursors received so far, in order
    pub fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }
}

/// Paging policy with millisecond backoff so retry tests stay fast
pub fn fast_policy() -> PagingPolicy {
    PagingPolicy {
        retry: RetryPolicy {
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            max_times: 3,
        },
        ..PagingPolicy::default()
    }
}

pub fn throttled() -> AwsError {
    AwsError::Throttled {
        code: "ThrottlingException".to_string(),
    }
}

pub fn not_found(code: &str) -> AwsError {
    AwsError::NotFound {
        code: code.to_string(),
        message: format!("{code} (test)"),
    }
}

pub fn access_denied() -> AwsError {
    AwsError::AccessDenied {
        code: "AccessDenied".to_string(),
        message: "not authorized (test)".to_string(),
    }
}

pub fn service_error(message: &str) -> AwsError {
    AwsError::Sdk {
        code: Some("InternalFailure".to_string()),
        message: message.to_string(),
    }
}
