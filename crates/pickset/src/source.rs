//! Item sources and the driver that runs them.
//!
//! A [`DataSource`] answers [`PageRequest`]s asynchronously. The widget never
//! awaits it: a [`SourceDriver`] spawns each fetch on an [`AsyncRuntime`]
//! and the result is posted back as a [`Completion`], which the widget
//! drains on its next event-loop turn. Whether the completion is still
//! wanted is decided by the pagination controller from its ticket.
//!
//! [`VecSource`] is an in-memory source for demos and tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use pickset_core::logging::targets;
use pickset_core::{completion_channel, AsyncRuntime, CompletionReceiver, CompletionSender};
use thiserror::Error;

use crate::pagination::{FetchTicket, PageRequest, PageResponse};

/// Errors reported by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The source failed to produce the page.
    #[error("data source error: {0}")]
    Source(String),
    /// The source did not answer in time.
    #[error("data source timed out")]
    Timeout,
}

/// An asynchronous, paged item source.
///
/// Implementations must tolerate being called repeatedly with the same
/// request; responses for superseded requests are discarded by the caller.
pub trait DataSource<T>: Send + Sync + 'static {
    /// Fetch one page of matches for `request.query`.
    fn fetch(&self, request: &PageRequest) -> BoxFuture<'static, Result<PageResponse<T>, FetchError>>;
}

impl<T, F> DataSource<T> for F
where
    F: Fn(&PageRequest) -> BoxFuture<'static, Result<PageResponse<T>, FetchError>>
        + Send
        + Sync
        + 'static,
{
    fn fetch(&self, request: &PageRequest) -> BoxFuture<'static, Result<PageResponse<T>, FetchError>> {
        self(request)
    }
}

/// What an in-memory source returns for a blank query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyQueryPolicy {
    /// Every item matches.
    #[default]
    MatchAll,
    /// Nothing matches until the user types something.
    MatchNone,
}

type Matcher<T> = Arc<dyn Fn(&T, &str) -> bool + Send + Sync>;

/// A [`DataSource`] over a fixed list of items.
pub struct VecSource<T> {
    items: Arc<Vec<T>>,
    matcher: Matcher<T>,
    latency: Option<Duration>,
    empty_query: EmptyQueryPolicy,
    failures_left: Arc<AtomicUsize>,
}

impl<T> Clone for VecSource<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            matcher: self.matcher.clone(),
            latency: self.latency,
            empty_query: self.empty_query,
            failures_left: self.failures_left.clone(),
        }
    }
}

impl<T> std::fmt::Debug for VecSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VecSource")
            .field("items", &self.items.len())
            .field("latency", &self.latency)
            .field("empty_query", &self.empty_query)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> VecSource<T> {
    /// Create a source that matches items with `matcher(item, query)`.
    pub fn new<M>(items: Vec<T>, matcher: M) -> Self
    where
        M: Fn(&T, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            items: Arc::new(items),
            matcher: Arc::new(matcher),
            latency: None,
            empty_query: EmptyQueryPolicy::default(),
            failures_left: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delay every response using builder pattern.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Set the blank-query behavior using builder pattern.
    pub fn with_empty_query_policy(mut self, policy: EmptyQueryPolicy) -> Self {
        self.empty_query = policy;
        self
    }

    /// Make the next `count` fetches fail.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Number of items in the source.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compute a page synchronously, ignoring latency and failures.
    pub fn page(&self, request: &PageRequest) -> PageResponse<T> {
        let query = request.query.trim();
        let matches: Vec<&T> = if query.is_empty() {
            match self.empty_query {
                EmptyQueryPolicy::MatchAll => self.items.iter().collect(),
                EmptyQueryPolicy::MatchNone => Vec::new(),
            }
        } else {
            self.items
                .iter()
                .filter(|item| (self.matcher)(item, query))
                .collect()
        };

        let items = matches
            .iter()
            .skip(request.offset())
            .take(request.page_size)
            .map(|item| (*item).clone())
            .collect();

        PageResponse {
            items,
            total: matches.len(),
        }
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl<T: Clone + Send + Sync + 'static> DataSource<T> for VecSource<T> {
    fn fetch(&self, request: &PageRequest) -> BoxFuture<'static, Result<PageResponse<T>, FetchError>> {
        let fail = self.take_failure();
        let source = self.clone();
        let request = request.clone();
        async move {
            if let Some(latency) = source.latency {
                tokio::time::sleep(latency).await;
            }
            if fail {
                return Err(FetchError::Source(format!(
                    "simulated failure for page {}",
                    request.page
                )));
            }
            Ok(source.page(&request))
        }
        .boxed()
    }
}

/// A finished fetch, tagged with the ticket it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T> {
    pub ticket: FetchTicket,
    pub result: Result<PageResponse<T>, FetchError>,
}

/// Runs fetches on an async runtime and collects their completions.
pub struct SourceDriver<T> {
    source: Arc<dyn DataSource<T>>,
    runtime: Arc<AsyncRuntime>,
    sender: CompletionSender<Completion<T>>,
    receiver: CompletionReceiver<Completion<T>>,
}

impl<T: Send + 'static> SourceDriver<T> {
    pub fn new(source: Arc<dyn DataSource<T>>, runtime: Arc<AsyncRuntime>) -> Self {
        let (sender, receiver) = completion_channel();
        Self {
            source,
            runtime,
            sender,
            receiver,
        }
    }

    /// Start a fetch. Its completion shows up in [`SourceDriver::drain`].
    pub fn dispatch(&self, request: &PageRequest) {
        let ticket = request.ticket;
        let fetch = self.source.fetch(request);
        tracing::debug!(target: targets::SOURCE, ?ticket, query = %request.query, "fetch dispatched");
        self.runtime.spawn_posting(
            async move {
                Completion {
                    ticket,
                    result: fetch.await,
                }
            },
            self.sender.clone(),
        );
    }

    /// Take every completion that has arrived.
    pub fn drain(&mut self) -> Vec<Completion<T>> {
        self.receiver.drain()
    }

    /// Block until the next completion arrives or `timeout` elapses.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<Completion<T>> {
        self.runtime.wait_for(&mut self.receiver, timeout)
    }

    pub fn runtime(&self) -> &Arc<AsyncRuntime> {
        &self.runtime
    }
}

impl<T> std::fmt::Debug for SourceDriver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDriver")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}
