//! Cursor-driven pagination with throttle-aware backoff
//!
//! Every listing call in the crate goes through [`drain`]. Pages are fetched
//! strictly in order: page N+1 is requested with the cursor read from page N.
//! The loop ends when a page carries no cursor, when a cursor repeats, or
//! when the page cap is hit, so a misbehaving provider cannot spin it forever.

use super::error::AwsError;
use backon::{ExponentialBuilder, Retryable};
use cloud_inventory_common::defaults::{
    DEFAULT_MAX_PAGES, DEFAULT_RETRY_MAX_DELAY_MS, DEFAULT_RETRY_MAX_TIMES,
    DEFAULT_RETRY_MIN_DELAY_MS,
};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// One page of a listing call
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation cursor; `None` on the last page
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// Build a page, treating an empty cursor as "no more pages".
    pub fn new(items: Vec<T>, next: Option<&str>) -> Self {
        Self {
            items,
            next: next.filter(|c| !c.is_empty()).map(str::to_string),
        }
    }

    /// A final page
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Backoff applied to a single call that the provider throttled
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_times: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(DEFAULT_RETRY_MIN_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            max_times: DEFAULT_RETRY_MAX_TIMES,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_times)
            .with_factor(2.0)
            .with_jitter()
    }
}

/// How a listing loop paces itself
#[derive(Debug, Clone, PartialEq)]
pub struct PagingPolicy {
    pub retry: RetryPolicy,
    /// Fixed pause between pages (zero disables it)
    pub page_delay: Duration,
    /// Hard cap on requests per listing
    pub max_pages: usize,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            page_delay: Duration::ZERO,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PagingPolicy {
    /// Same policy with a fixed inter-page delay
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
}

/// Why a listing stopped before the provider said it was done
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaginationError {
    #[error(transparent)]
    Provider(#[from] AwsError),

    #[error("cursor was returned twice after {pages} page(s); stopping to avoid a loop")]
    RepeatedCursor { cursor: String, pages: usize },

    #[error("stopped after reaching the limit of {0} pages")]
    PageLimit(usize),
}

/// Everything a listing produced, plus the reason it stopped early (if any)
#[derive(Debug)]
pub struct Drained<T> {
    pub items: Vec<T>,
    /// Successful page requests
    pub requests: usize,
    pub interrupted: Option<PaginationError>,
}

impl<T> Drained<T> {
    /// True when the very first page failed, i.e. nothing could be listed
    pub fn failed_outright(&self) -> bool {
        self.requests == 0 && self.interrupted.is_some()
    }

    /// Split into items and the interruption, if any
    pub fn into_parts(self) -> (Vec<T>, Option<PaginationError>) {
        (self.items, self.interrupted)
    }
}

/// Run a single call, retrying it with backoff while the provider throttles.
///
/// Any other error is returned as-is on the first occurrence.
pub async fn retrying<T, F, Fut>(scope: &str, retry: &RetryPolicy, call: F) -> Result<T, AwsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AwsError>>,
{
    call.retry(retry.backoff())
        .when(AwsError::is_retryable)
        .notify(|e: &AwsError, dur: Duration| {
            warn!(scope, delay = ?dur, error = %e, "AWS rate limited, backing off...");
        })
        .await
}

/// Fetch every page of a listing.
///
/// `fetch` receives the cursor for the page to request (`None` for the
/// first page). Throttled calls are retried with exponential backoff; any
/// other error stops the loop and is returned in [`Drained::interrupted`]
/// alongside whatever was collected before it.
///
/// # Example
/// ```ignore
/// let queues = drain("sqs:list-queues", &policy, |token| api.list_queues(token)).await;
/// ```
pub async fn drain<T, F, Fut>(scope: &str, policy: &PagingPolicy, mut fetch: F) -> Drained<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, AwsError>>,
{
    let mut items = Vec::new();
    let mut requests = 0usize;
    let mut seen: HashSet<String> = HashSet::new();
    let mut cursor: Option<String> = None;

    let interrupted = loop {
        if requests >= policy.max_pages {
            warn!(scope, pages = requests, "Page limit reached, stopping listing");
            break Some(PaginationError::PageLimit(policy.max_pages));
        }

        let request_cursor = cursor.clone();
        let result = retrying(scope, &policy.retry, || fetch(request_cursor.clone())).await;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                debug!(scope, pages = requests, error = %e, "Listing failed");
                break Some(PaginationError::Provider(e));
            }
        };
        requests += 1;
        items.extend(page.items);

        let Some(next) = page.next.filter(|c| !c.is_empty()) else {
            break None;
        };

        if let Some(previous) = &cursor {
            seen.insert(previous.clone());
        }
        if seen.contains(&next) || cursor.as_deref() == Some(next.as_str()) {
            warn!(scope, pages = requests, "Provider repeated a pagination cursor");
            break Some(PaginationError::RepeatedCursor {
                cursor: next,
                pages: requests,
            });
        }
        cursor = Some(next);

        if !policy.page_delay.is_zero() {
            tokio::time::sleep(policy.page_delay).await;
        }
    };

    debug!(scope, pages = requests, items = items.len(), "Listing drained");
    Drained {
        items,
        requests,
        interrupted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedPages, fast_policy, throttled};

    #[tokio::test]
    async fn test_one_request_per_page_in_order() {
        let pages = ScriptedPages::new(vec![
            Ok(Page::new(vec![1, 2], Some("c1"))),
            Ok(Page::new(vec![3], Some("c2"))),
            Ok(Page::last(vec![4, 5])),
        ]);

        let drained = drain("test", &fast_policy(), |c| pages.next(c)).await;

        assert_eq!(drained.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(drained.requests, 3);
        assert!(drained.interrupted.is_none());
        assert_eq!(
            pages.requests(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_cursor_ends_listing() {
        let pages = ScriptedPages::new(vec![Ok(Page {
            items: vec!["a"],
            next: Some(String::new()),
        })]);

        let drained = drain("test", &fast_policy(), |c| pages.next(c)).await;
        assert_eq!(drained.items, vec!["a"]);
        assert_eq!(pages.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_cursor_terminates() {
        let pages = ScriptedPages::new(vec![
            Ok(Page::new(vec![1], Some("same"))),
            Ok(Page::new(vec![2], Some("same"))),
            Ok(Page::new(vec![3], Some("same"))),
        ]);

        let drained = drain("test", &fast_policy(), |c| pages.next(c)).await;

        assert_eq!(drained.items, vec![1, 2]);
        assert_eq!(pages.requests().len(), 2);
        assert_eq!(
            drained.interrupted,
            Some(PaginationError::RepeatedCursor {
                cursor: "same".to_string(),
                pages: 2
            })
        );
    }

    #[tokio::test]
    async fn test_cursor_cycle_terminates() {
        let pages = ScriptedPages::new(vec![
            Ok(Page::new(vec![1], Some("a"))),
            Ok(Page::new(vec![2], Some("b"))),
            Ok(Page::new(vec![3], Some("a"))),
        ]);

        let drained = drain("test", &fast_policy(), |c| pages.next(c)).await;

        assert_eq!(drained.items, vec![1, 2, 3]);
        assert!(matches!(
            drained.interrupted,
            Some(PaginationError::RepeatedCursor { .. })
        ));
        let issued = pages.requests();
        let unique: HashSet<_> = issued.iter().collect();
        assert_eq!(issued.len(), unique.len(), "a cursor was issued twice");
    }

    #[tokio::test]
    async fn test_page_limit() {
        let pages = ScriptedPages::new(
            (0..10)
                .map(|i| Ok(Page::new(vec![i], Some(&format!("c{i}")))))
                .collect(),
        );
        let policy = PagingPolicy {
            max_pages: 3,
            ..fast_policy()
        };

        let drained = drain("test", &policy, |c| pages.next(c)).await;
        assert_eq!(drained.items, vec![0, 1, 2]);
        assert_eq!(drained.interrupted, Some(PaginationError::PageLimit(3)));
    }

    #[tokio::test]
    async fn test_throttled_page_is_retried() {
        let pages = ScriptedPages::new(vec![
            Ok(Page::new(vec![1], Some("c1"))),
            Err(throttled()),
            Err(throttled()),
            Ok(Page::last(vec![2])),
        ]);

        let drained = drain("test", &fast_policy(), |c| pages.next(c)).await;

        assert_eq!(drained.items, vec![1, 2]);
        assert!(drained.interrupted.is_none());
        assert_eq!(drained.requests, 2);
        // The throttled cursor is re-sent, never a stale one
        assert_eq!(
            pages.requests(),
            vec![
                None,
                Some("c1".to_string()),
                Some("c1".to_string()),
                Some("c1".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_retrying_gives_up_after_max_times() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let result: Result<(), AwsError> = retrying("test", &fast_policy().retry, || {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            std::future::ready(Err(throttled()))
        })
        .await;

        assert!(result.unwrap_err().is_retryable());
        // First attempt plus max_times retries
        assert_eq!(calls.into_inner(), 4);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let denied = AwsError::AccessDenied {
            code: "AccessDenied".to_string(),
            message: "nope".to_string(),
        };
        let pages: ScriptedPages<u8> = ScriptedPages::new(vec![Err(denied.clone())]);

        let drained = drain("test", &fast_policy(), |c| pages.next(c)).await;

        assert!(drained.failed_outright());
        assert_eq!(drained.interrupted, Some(PaginationError::Provider(denied)));
        assert_eq!(pages.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_mid_listing_failure_keeps_earlier_items() {
        let pages = ScriptedPages::new(vec![
            Ok(Page::new(vec!["a", "b"], Some("c1"))),
            Err(AwsError::Sdk {
                code: None,
                message: "connection reset".to_string(),
            }),
        ]);

        let drained = drain("test", &fast_policy(), |c| pages.next(c)).await;
        assert!(!drained.failed_outright());
        let (items, interrupted) = drained.into_parts();
        assert_eq!(items, vec!["a", "b"]);
        assert!(interrupted.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_delay_is_applied_between_pages() {
        let pages = ScriptedPages::new(vec![
            Ok(Page::new(vec![1], Some("c1"))),
            Ok(Page::new(vec![2], Some("c2"))),
            Ok(Page::last(vec![3])),
        ]);
        let policy = fast_policy().with_page_delay(Duration::from_secs(2));

        let start = tokio::time::Instant::now();
        drain("test", &policy, |c| pages.next(c)).await;

        // Two gaps between three pages, none after the last
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }
}
