//! Search debouncer.
//!
//! Keystrokes arrive far faster than a data source should be queried. The
//! debouncer holds at most one pending dispatch: every update cancels the
//! previous timer and arms a new one, so a query is only dispatched after it
//! has been stable for the whole quiet period. An empty query is dispatched
//! like any other.
//!
//! Timers live in the widget's [`TimerManager`]; the debouncer only owns its
//! pending [`TimerId`] and claims it back through [`SearchDebouncer::on_timer`].

use std::time::{Duration, Instant};

use pickset_core::logging::targets;
use pickset_core::{TimerId, TimerManager};

/// Default quiet period before a query is dispatched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct PendingQuery {
    timer: TimerId,
    query: String,
}

/// Coalesces query updates into single dispatches.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<PendingQuery>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchDebouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a query update at `now`, superseding any pending dispatch.
    pub fn schedule(&mut self, timers: &mut TimerManager, now: Instant, query: impl Into<String>) {
        self.cancel(timers);
        let query = query.into();
        let timer = timers.start_one_shot_at(now, self.delay);
        tracing::trace!(target: targets::DEBOUNCE, query = %query, "dispatch armed");
        self.pending = Some(PendingQuery { timer, query });
    }

    /// Drop the pending dispatch, if any.
    pub fn cancel(&mut self, timers: &mut TimerManager) {
        if let Some(pending) = self.pending.take() {
            // Already-fired timers are gone from the manager; nothing to undo.
            let _ = timers.stop(pending.timer);
            tracing::trace!(target: targets::DEBOUNCE, query = %pending.query, "dispatch superseded");
        }
    }

    /// Whether a dispatch is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The query that will be dispatched, if one is pending.
    pub fn pending_query(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.query.as_str())
    }

    /// Claim a fired timer.
    ///
    /// Returns the query to dispatch when `id` is this debouncer's timer,
    /// otherwise `None` and the timer belongs to someone else.
    pub fn on_timer(&mut self, id: TimerId) -> Option<String> {
        if !self.pending.as_ref().is_some_and(|p| p.timer == id) {
            return None;
        }
        let query = self.pending.take()?.query;
        tracing::debug!(target: targets::DEBOUNCE, query = %query, "query dispatched");
        Some(query)
    }
}
