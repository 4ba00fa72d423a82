//! Timer queue driven by an explicit clock.
//!
//! Widgets never sleep. They register deadlines here and the host event loop
//! calls [`TimerManager::process_expired_at`] with the current instant. Every
//! timer is one-shot; taking `now` as a parameter keeps timing deterministic
//! under test.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
    // Insertion sequence; breaks ties so equal deadlines fire in start order.
    seq: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.seq == other.seq
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Owns every pending deadline of one event loop.
///
/// Stopped timers are removed from the slot map immediately; their stale
/// queue entries are skipped lazily when they reach the front. Slot map keys
/// are versioned, so a stale entry never matches a newer timer.
pub struct TimerManager {
    // Pending timers and the duration each was started with.
    timers: SlotMap<TimerId, Duration>,
    queue: BinaryHeap<TimerQueueEntry>,
    next_seq: u64,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    pub fn start_one_shot_at(&mut self, now: Instant, duration: Duration) -> TimerId {
        let fire_time = now + duration;
        let id = self.timers.insert(duration);
        self.push(id, fire_time);
        tracing::trace!(target: targets::TIMER, ?id, ?duration, "timer started");
        id
    }

    fn push(&mut self, id: TimerId, fire_time: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(TimerQueueEntry { id, fire_time, seq });
    }

    /// Stop and remove a timer.
    ///
    /// Returns an error if the timer already fired or was never started here.
    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId)
        }
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Duration from `now` until the next timer fires, if any.
    pub fn time_until_next_at(&mut self, now: Instant) -> Option<Duration> {
        self.discard_stale();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }

    /// Fire every timer whose deadline is at or before `now`.
    ///
    /// Returns the fired IDs in deadline order and removes them.
    #[tracing::instrument(skip(self), target = "pickset_core::timer", level = "trace")]
    pub fn process_expired_at(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            if let Some(duration) = self.timers.remove(entry.id) {
                tracing::trace!(target: targets::TIMER, id = ?entry.id, ?duration, "timer fired");
                fired.push(entry.id);
            }
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Stop every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("active", &self.timers.len())
            .finish()
    }
}
