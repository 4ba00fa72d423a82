//! Prelude module for Pickset.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use pickset::prelude::*;
//! ```
//!
//! This provides access to:
//! - Signal/slot system (`Signal`, `Property`, `ConnectionGuard`)
//! - Event loop (`TimerManager`, `AsyncRuntime`)
//! - The filter widget (`MultiFilter`, `SharedSelection`, `FilterMode`)
//! - Item sources (`DataSource`, `VecSource`)

// ============================================================================
// Signal/Slot and Property System
// ============================================================================

pub use crate::{ConnectionGuard, ConnectionId, Property, Signal};

// ============================================================================
// Event Loop
// ============================================================================

pub use crate::{AsyncRuntime, TimerManager};

// ============================================================================
// Filter Widget
// ============================================================================

pub use crate::{
    FilterConfig, FilterMode, FilterView, FilterableItem, MultiFilter, SharedSelection,
    WidgetLayout,
};
pub use crate::render::ItemRenderer;

// ============================================================================
// Item Sources
// ============================================================================

pub use crate::{DataSource, PageRequest, PageResponse, ScrollMetrics, VecSource};

// ============================================================================
// Geometry
// ============================================================================

pub use crate::{Point, Rect, Size};
