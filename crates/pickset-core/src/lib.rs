//! Core systems for Pickset.
//!
//! This crate provides the event-loop primitives the filter widgets are
//! built on:
//!
//! - **Signal/Slot System**: Type-safe notifications from widgets to their owners
//! - **Property System**: Values with change detection
//! - **Timers**: A one-shot deadline queue driven by an explicit clock
//! - **Async Runtime**: A Tokio thread that posts fetch results back to the loop
//!
//! # Signal/Slot Example
//!
//! ```
//! use pickset_core::Signal;
//!
//! let selection_changed = Signal::<Vec<u32>>::new();
//!
//! let conn_id = selection_changed.connect(|ids| {
//!     println!("Selection is now: {ids:?}");
//! });
//!
//! selection_changed.emit(vec![1, 2, 3]);
//! selection_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use pickset_core::TimerManager;
//! use std::time::{Duration, Instant};
//!
//! let mut timers = TimerManager::new();
//! let start = Instant::now();
//! let id = timers.start_one_shot_at(start, Duration::from_millis(300));
//!
//! assert!(timers.process_expired_at(start).is_empty());
//! assert_eq!(timers.process_expired_at(start + Duration::from_millis(300)), vec![id]);
//! ```

pub mod async_runtime;
mod error;
pub mod logging;
pub mod property;
pub mod signal;
mod timer;

pub use async_runtime::{completion_channel, AsyncRuntime, CompletionReceiver, CompletionSender};
pub use error::{AsyncRuntimeError, TimerError};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerManager};
