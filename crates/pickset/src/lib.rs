//! Pickset - headless multi-select filter widgets.
//!
//! This is the main crate. It re-exports the event-loop primitives from
//! `pickset_core` and adds the filter widget built on them:
//!
//! - a host-owned selection with a snapshot cache for off-page items
//! - include/exclude/empty/not-empty filter modes
//! - debounced search against an asynchronous, paged [`DataSource`]
//! - incremental loading when the list scrolls near its bottom
//! - a hover preview that picks the side of the widget with more room
//! - mutually exclusive overlays closed by outside presses
//!
//! Drawing is left to the host. Each item kind plugs in an
//! [`ItemRenderer`](render::ItemRenderer) and the widget hands back a
//! [`FilterView`] per frame.
//!
//! # Example
//!
//! ```
//! use pickset::prelude::*;
//! use pickset::render::FnRenderer;
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Color(&'static str);
//!
//! impl FilterableItem for Color {
//!     type Id = &'static str;
//!     fn id(&self) -> &&'static str { &self.0 }
//! }
//!
//! let runtime = Arc::new(AsyncRuntime::new().unwrap());
//! let source = VecSource::new(
//!     vec![Color("red"), Color("green"), Color("blue")],
//!     |c: &Color, q: &str| c.0.contains(q),
//! );
//! let renderer = FnRenderer::new(
//!     |c: &Color, _| c.0.to_string(),
//!     |c: &Color, _| c.0.to_string(),
//!     |c: &Color, _| c.0.to_string(),
//! );
//!
//! let selection = SharedSelection::new();
//! let mut filter = MultiFilter::new(FilterConfig::new(), selection.clone(), renderer)
//!     .with_source(Arc::new(source), runtime);
//!
//! let t0 = Instant::now();
//! filter.mount(t0);
//! filter.set_query(t0, "re");
//! filter.pump(t0 + Duration::from_millis(300));
//! filter.wait_for_fetch(Duration::from_secs(2));
//!
//! let names: Vec<_> = filter.items().iter().map(|c| c.0).collect();
//! assert_eq!(names, ["red", "green"]);
//! ```

pub use pickset_core::*;

pub mod config;
pub mod debounce;
pub mod geometry;
pub mod highlight;
mod item;
pub mod mode;
pub mod overlay;
pub mod pagination;
pub mod prelude;
pub mod preview;
pub mod render;
pub mod selection;
mod shell;
pub mod source;
pub mod view;

pub use config::{ConfigError, DisplayToggles, FilterConfig, ModeLabels};
pub use debounce::SearchDebouncer;
pub use geometry::{Point, Rect, Size};
pub use item::FilterableItem;
pub use mode::{FilterMode, FilterModeState, ModeTransition};
pub use overlay::{
    OverlayCoordinator, OverlayState, PointerDown, PointerSource, PrimaryOverlay, WidgetLayout,
};
pub use pagination::{
    ApplyOutcome, FetchKind, FetchTicket, PageRequest, PageResponse, Pagination, ScrollMetrics,
};
pub use preview::{HoverPreview, PreviewPlacement, PreviewSide};
pub use selection::{SelectionStore, SharedSelection};
pub use shell::MultiFilter;
pub use source::{DataSource, EmptyQueryPolicy, FetchError, SourceDriver, VecSource};
pub use view::{FilterOutput, FilterView, ListStatus};

static_assertions::assert_impl_all!(FilterConfig: Send, Sync);
static_assertions::assert_impl_all!(OverlayCoordinator: Send);
static_assertions::assert_impl_all!(PageRequest: Send, Sync);
