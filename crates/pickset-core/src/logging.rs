//! Logging facilities for Pickset.
//!
//! Pickset uses the `tracing` crate for instrumentation. Every log line
//! carries an explicit target from [`targets`], so hosts can filter a
//! single subsystem:
//!
//! ```text
//! RUST_LOG=pickset::pagination=debug,pickset_core=warn
//! ```
//!
//! Nothing is printed until the host installs a subscriber, for example
//! `tracing_subscriber::fmt::init()`.

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "pickset_core";
    /// Timer system target.
    pub const TIMER: &str = "pickset_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "pickset_core::signal";
    /// Async runtime target.
    pub const RUNTIME: &str = "pickset_core::async_runtime";

    /// Widget crate target.
    pub const WIDGET: &str = "pickset";
    /// Selection store target.
    pub const SELECTION: &str = "pickset::selection";
    /// Filter mode target.
    pub const MODE: &str = "pickset::mode";
    /// Search debouncer target.
    pub const DEBOUNCE: &str = "pickset::debounce";
    /// Pagination controller target.
    pub const PAGINATION: &str = "pickset::pagination";
    /// Overlay coordinator target.
    pub const OVERLAY: &str = "pickset::overlay";
    /// Hover preview target.
    pub const PREVIEW: &str = "pickset::preview";
    /// Data source driver target.
    pub const SOURCE: &str = "pickset::source";
    /// Widget shell target.
    pub const SHELL: &str = "pickset::shell";
}

/// A guard that times a named operation.
///
/// Enters an `info`-level span on creation and exits it when dropped, so a
/// timing-aware subscriber reports how long the operation ran.
///
/// ```
/// use pickset_core::logging::PerfSpan;
///
/// let _span = PerfSpan::new("pump");
/// // ... work ...
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "pickset::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}
