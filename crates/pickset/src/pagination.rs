//! Pagination controller.
//!
//! Owns the page window for the active query: the accumulated items, the
//! page counter, the total reported by the source and the "more pages"
//! flag. Every request carries a [`FetchTicket`]; a response is applied
//! only if its ticket is still the one in flight, which makes responses for
//! superseded queries harmless no matter when they arrive.
//!
//! At most one fetch is in flight. [`Pagination::load_more`] is rejected
//! while one is outstanding, so pages never overlap.

use pickset_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::source::FetchError;

/// Distance from the bottom of the list, in scroll units, that triggers
/// loading the next page.
pub const LOAD_MORE_THRESHOLD: f32 = 50.0;

/// Whether a request starts a new query or extends the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    FirstPage,
    NextPage,
}

/// Identifies one request so its response can be matched or discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket {
    /// Bumped on every new query; older generations are stale.
    pub generation: u64,
    /// 1-based page number.
    pub page: usize,
    pub kind: FetchKind,
}

/// A request for one page of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub ticket: FetchTicket,
    pub query: String,
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Index of the first item of this page in the full result set.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// One page returned by a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    /// Total number of matches for the query across all pages.
    pub total: usize,
}

/// What applying a response did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A first page replaced the window.
    Replaced { count: usize },
    /// A next page was appended.
    Appended { count: usize },
    /// The fetch failed; the window is unchanged.
    Failed,
    /// The response was for a superseded request and was dropped.
    Stale,
}

/// Scroll position of the item list, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Remaining scrollable distance below the viewport.
    pub fn distance_to_bottom(&self) -> f32 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    /// Whether the viewport is within [`LOAD_MORE_THRESHOLD`] of the end.
    pub fn near_bottom(&self) -> bool {
        self.distance_to_bottom() <= LOAD_MORE_THRESHOLD
    }
}

/// Loaded items for the active query.
#[derive(Debug, Clone)]
pub struct PageWindow<T> {
    items: Vec<T>,
    page: usize,
    total: usize,
    has_more: bool,
    query: String,
}

impl<T> Default for PageWindow<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total: 0,
            has_more: false,
            query: String::new(),
        }
    }
}

impl<T> PageWindow<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The last page that has been loaded (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// The query these items were loaded for.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Drives first-page and load-more requests for one widget.
#[derive(Debug)]
pub struct Pagination<T> {
    page_size: usize,
    window: PageWindow<T>,
    dispatched_query: Option<String>,
    generation: u64,
    in_flight: Option<FetchTicket>,
}

impl<T> Pagination<T> {
    /// Create a controller. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            window: PageWindow::default(),
            dispatched_query: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn window(&self) -> &PageWindow<T> {
        &self.window
    }

    pub fn items(&self) -> &[T] {
        &self.window.items
    }

    pub fn has_more(&self) -> bool {
        self.window.has_more
    }

    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The ticket of the outstanding fetch.
    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    /// The most recently dispatched query, once any has been dispatched.
    pub fn dispatched_query(&self) -> Option<&str> {
        self.dispatched_query.as_deref()
    }

    /// Start a new query from page 1.
    ///
    /// Supersedes any outstanding fetch. The current window stays visible
    /// until the new first page arrives.
    pub fn fetch_first_page(&mut self, query: impl Into<String>) -> PageRequest {
        let query = query.into();
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            page: 1,
            kind: FetchKind::FirstPage,
        };
        if let Some(old) = self.in_flight.replace(ticket) {
            tracing::debug!(target: targets::PAGINATION, ?old, "outstanding fetch superseded");
        }
        self.dispatched_query = Some(query.clone());

        tracing::debug!(target: targets::PAGINATION, query = %query, generation = self.generation, "first page requested");

        PageRequest {
            ticket,
            query,
            page: 1,
            page_size: self.page_size,
        }
    }

    /// Request the next page of the query the loaded window belongs to.
    ///
    /// Returns `None` without changing anything when a fetch is in flight
    /// or when no more pages exist. A first page that failed leaves the
    /// previous window in place, so paging continues that window.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            tracing::trace!(target: targets::PAGINATION, "load more rejected: fetch in flight");
            return None;
        }
        if !self.window.has_more {
            return None;
        }
        let query = self.window.query.clone();
        let page = self.window.page + 1;
        let ticket = FetchTicket {
            generation: self.generation,
            page,
            kind: FetchKind::NextPage,
        };
        self.in_flight = Some(ticket);

        tracing::debug!(target: targets::PAGINATION, query = %query, page, "next page requested");

        Some(PageRequest {
            ticket,
            query,
            page,
            page_size: self.page_size,
        })
    }

    /// Whether a scroll position should trigger [`Pagination::load_more`].
    pub fn should_load_more(&self, metrics: ScrollMetrics) -> bool {
        metrics.near_bottom() && !self.is_loading() && self.window.has_more
    }

    /// Apply a fetch result.
    ///
    /// Results whose ticket is not the outstanding one are dropped. A
    /// failure clears the loading state and leaves the window untouched.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResponse<T>, FetchError>,
    ) -> ApplyOutcome {
        if self.in_flight != Some(ticket) {
            tracing::debug!(target: targets::PAGINATION, ?ticket, "stale response ignored");
            return ApplyOutcome::Stale;
        }
        self.in_flight = None;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(target: targets::PAGINATION, ?ticket, error = %err, "fetch failed");
                return ApplyOutcome::Failed;
            }
        };

        let count = response.items.len();
        self.window.total = response.total;
        self.window.page = ticket.page;
        let outcome = match ticket.kind {
            FetchKind::FirstPage => {
                self.window.items = response.items;
                self.window.has_more = response.total > self.page_size;
                self.window.query = self.dispatched_query.clone().unwrap_or_default();
                ApplyOutcome::Replaced { count }
            }
            FetchKind::NextPage => {
                self.window.items.extend(response.items);
                self.window.has_more = self.window.items.len() < response.total;
                ApplyOutcome::Appended { count }
            }
        };

        tracing::debug!(
            target: targets::PAGINATION,
            loaded = self.window.items.len(),
            total = self.window.total,
            has_more = self.window.has_more,
            "page applied"
        );
        outcome
    }

    /// Forget any outstanding fetch so its response will be ignored.
    pub fn abandon_in_flight(&mut self) {
        if self.in_flight.take().is_some() {
            self.generation += 1;
            tracing::debug!(target: targets::PAGINATION, "outstanding fetch abandoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(start: usize, len: usize, total: usize) -> PageResponse<usize> {
        PageResponse {
            items: (start..start + len).collect(),
            total,
        }
    }

    #[test]
    fn test_twenty_five_items_in_pages_of_ten() {
        let mut pager = Pagination::new(10);

        let first = pager.fetch_first_page("x");
        assert_eq!(first.offset(), 0);
        assert!(pager.load_more().is_none());
        assert_eq!(
            pager.apply(first.ticket, Ok(page(0, 10, 25))),
            ApplyOutcome::Replaced { count: 10 }
        );
        assert_eq!(pager.items().len(), 10);
        assert!(pager.has_more());

        let second = pager.load_more().unwrap();
        assert_eq!((second.page, second.offset()), (2, 10));
        pager.apply(second.ticket, Ok(page(10, 10, 25)));
        assert_eq!(pager.items().len(), 20);
        assert!(pager.has_more());

        let third = pager.load_more().unwrap();
        pager.apply(third.ticket, Ok(page(20, 5, 25)));
        assert_eq!(pager.items().len(), 25);
        assert!(!pager.has_more());
        assert_eq!(pager.window().page(), 3);

        assert!(pager.load_more().is_none());
        assert_eq!(pager.items().len(), 25);
    }

    #[test]
    fn test_load_more_rejected_while_in_flight() {
        let mut pager = Pagination::new(10);
        let first = pager.fetch_first_page("x");
        pager.apply(first.ticket, Ok(page(0, 10, 30)));

        let next = pager.load_more().unwrap();
        assert!(pager.load_more().is_none());
        assert_eq!(pager.in_flight(), Some(next.ticket));
    }

    #[test]
    fn test_stale_first_page_ignored() {
        let mut pager = Pagination::new(10);
        let old = pager.fetch_first_page("AB");
        let new = pager.fetch_first_page("ABC");

        assert_eq!(pager.apply(old.ticket, Ok(page(0, 10, 99))), ApplyOutcome::Stale);
        assert!(pager.is_loading());
        assert!(pager.items().is_empty());

        pager.apply(new.ticket, Ok(page(100, 3, 3)));
        assert_eq!(pager.items(), &[100, 101, 102]);
        assert_eq!(pager.window().query(), "ABC");
        assert!(!pager.has_more());
    }

    #[test]
    fn test_stale_next_page_ignored_after_new_query() {
        let mut pager = Pagination::new(2);
        let first = pager.fetch_first_page("a");
        pager.apply(first.ticket, Ok(page(0, 2, 10)));
        let more = pager.load_more().unwrap();

        let fresh = pager.fetch_first_page("b");
        assert_eq!(pager.apply(more.ticket, Ok(page(2, 2, 10))), ApplyOutcome::Stale);
        pager.apply(fresh.ticket, Ok(page(50, 1, 1)));
        assert_eq!(pager.items(), &[50]);
    }

    #[test]
    fn test_failure_leaves_window_unchanged() {
        let mut pager = Pagination::new(10);
        let first = pager.fetch_first_page("x");
        pager.apply(first.ticket, Ok(page(0, 10, 20)));

        let next = pager.load_more().unwrap();
        let outcome = pager.apply(next.ticket, Err(FetchError::Source("boom".into())));
        assert_eq!(outcome, ApplyOutcome::Failed);
        assert!(!pager.is_loading());
        assert_eq!(pager.items().len(), 10);
        assert_eq!(pager.window().page(), 1);
        assert!(pager.has_more());

        // The same page can be retried.
        assert_eq!(pager.load_more().map(|r| r.page), Some(2));
    }

    #[test]
    fn test_failed_first_page_keeps_paging_old_window() {
        let mut pager = Pagination::new(10);
        let first = pager.fetch_first_page("a");
        pager.apply(first.ticket, Ok(page(0, 10, 50)));
        let second = pager.load_more().unwrap();
        pager.apply(second.ticket, Ok(page(10, 10, 50)));

        let b = pager.fetch_first_page("b");
        assert_eq!(pager.window().page(), 2);
        assert_eq!(pager.apply(b.ticket, Err(FetchError::Timeout)), ApplyOutcome::Failed);
        assert_eq!(pager.window().query(), "a");
        assert_eq!(pager.window().page(), 2);

        let next = pager.load_more().unwrap();
        assert_eq!(next.query, "a");
        assert_eq!(next.page, 3);
        pager.apply(next.ticket, Ok(page(20, 10, 50)));
        assert_eq!(pager.items(), (0..30).collect::<Vec<_>>().as_slice());
        assert_eq!(pager.window().query(), "a");
    }

    #[test]
    fn test_abandon_makes_response_stale() {
        let mut pager = Pagination::<usize>::new(10);
        let first = pager.fetch_first_page("");
        pager.abandon_in_flight();
        assert!(!pager.is_loading());
        assert_eq!(pager.apply(first.ticket, Ok(page(0, 1, 1))), ApplyOutcome::Stale);
    }

    #[test]
    fn test_scroll_trigger() {
        let mut pager = Pagination::new(10);
        let near = ScrollMetrics::new(560.0, 1000.0, 400.0);
        let far = ScrollMetrics::new(100.0, 1000.0, 400.0);
        assert_eq!(near.distance_to_bottom(), 40.0);
        assert!(!pager.should_load_more(near));

        let first = pager.fetch_first_page("x");
        assert!(!pager.should_load_more(near));
        pager.apply(first.ticket, Ok(page(0, 10, 25)));

        assert!(pager.should_load_more(near));
        assert!(pager.should_load_more(ScrollMetrics::new(550.0, 1000.0, 400.0)));
        assert!(!pager.should_load_more(far));
    }
}
