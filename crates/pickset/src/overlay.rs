//! Overlay visibility coordination.
//!
//! A filter widget has three floating surfaces:
//!
//! - the value dropdown (search box plus item list),
//! - the mode menu,
//! - the expanded-selection flyout listing every selected tag.
//!
//! The value dropdown and the mode menu are mutually exclusive. The flyout
//! is independent: hovering the "+N" indicator shows it and leaving the
//! control hides it. Pointer presses outside the widget close overlays:
//! outside the root rectangle closes the dropdown and the flyout, outside
//! the mode menu's rectangle closes the mode menu (and the flyout with it).
//! The two checks are evaluated independently for every press.
//!
//! Outside presses arrive from a process-wide pointer source. The
//! coordinator subscribes only while some overlay is open, through a
//! scoped [`ConnectionGuard`] that is dropped as soon as everything closes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pickset_core::logging::targets;
use pickset_core::{ConnectionGuard, Signal, TimerId, TimerManager};

use crate::geometry::{Point, Rect};

/// Delay between opening the dropdown and focusing its search input.
pub const FOCUS_DELAY: Duration = Duration::from_millis(50);

/// A pointer press anywhere in the host window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub position: Point,
}

impl PointerDown {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
        }
    }
}

/// The global source of pointer presses, shared by every widget.
pub type PointerSource = Arc<Signal<PointerDown>>;

/// Where the host laid out the widget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WidgetLayout {
    /// The widget's root container, including the open dropdown.
    pub root: Rect,
    /// The mode button plus its menu. Falls back to `root` when absent.
    pub mode_menu: Option<Rect>,
    /// The visible viewport.
    pub viewport: Rect,
}

impl WidgetLayout {
    /// Presses outside this area close the mode menu.
    pub fn mode_menu_area(&self) -> Rect {
        self.mode_menu.unwrap_or(self.root)
    }
}

/// The mutually exclusive overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryOverlay {
    #[default]
    Closed,
    ValueOpen,
    ModeMenuOpen,
}

/// Visibility of every overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub primary: PrimaryOverlay,
    pub flyout: bool,
}

impl OverlayState {
    pub fn value_open(&self) -> bool {
        self.primary == PrimaryOverlay::ValueOpen
    }

    pub fn mode_menu_open(&self) -> bool {
        self.primary == PrimaryOverlay::ModeMenuOpen
    }

    /// Whether anything is visible.
    pub fn any_open(&self) -> bool {
        self.primary != PrimaryOverlay::Closed || self.flyout
    }
}

/// What a pointer press closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutsideClickEffect {
    pub closed_value: bool,
    pub closed_mode_menu: bool,
    pub closed_flyout: bool,
}

impl OutsideClickEffect {
    pub fn any(&self) -> bool {
        self.closed_value || self.closed_mode_menu || self.closed_flyout
    }
}

/// A scoped subscription to the pointer source.
///
/// Presses are queued into an inbox that the widget drains on its own
/// event-loop turn.
#[derive(Debug, Default)]
pub struct OutsideClickWatch {
    source: Option<PointerSource>,
    inbox: Arc<Mutex<Vec<PointerDown>>>,
    guard: Option<ConnectionGuard<PointerDown>>,
}

impl OutsideClickWatch {
    pub fn new(source: Option<PointerSource>) -> Self {
        Self {
            source,
            inbox: Arc::new(Mutex::new(Vec::new())),
            guard: None,
        }
    }

    /// Whether the subscription is live.
    pub fn is_armed(&self) -> bool {
        self.guard.is_some()
    }

    /// Subscribe if not already subscribed.
    pub fn arm(&mut self) {
        if self.guard.is_some() {
            return;
        }
        let Some(source) = &self.source else {
            return;
        };
        let inbox = self.inbox.clone();
        self.guard = Some(source.connect_scoped(move |event| inbox.lock().push(*event)));
        tracing::trace!(target: targets::OVERLAY, "outside-click watch armed");
    }

    /// Release the subscription and drop queued presses.
    pub fn disarm(&mut self) {
        if self.guard.take().is_some() {
            self.inbox.lock().clear();
            tracing::trace!(target: targets::OVERLAY, "outside-click watch released");
        }
    }

    /// Take every queued press.
    pub fn drain(&self) -> Vec<PointerDown> {
        std::mem::take(&mut *self.inbox.lock())
    }
}

/// Owns overlay visibility and the delayed search focus.
#[derive(Debug, Default)]
pub struct OverlayCoordinator {
    state: OverlayState,
    focus_timer: Option<TimerId>,
    watch: OutsideClickWatch,
}

impl OverlayCoordinator {
    pub fn new(pointer_source: Option<PointerSource>) -> Self {
        Self {
            state: OverlayState::default(),
            focus_timer: None,
            watch: OutsideClickWatch::new(pointer_source),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn watch(&self) -> &OutsideClickWatch {
        &self.watch
    }

    /// Open the value dropdown, closing the mode menu.
    ///
    /// Refused while the filter mode disables values. On success the search
    /// focus is scheduled [`FOCUS_DELAY`] after `now`.
    pub fn open_value(
        &mut self,
        timers: &mut TimerManager,
        now: Instant,
        values_disabled: bool,
    ) -> bool {
        if values_disabled {
            tracing::trace!(target: targets::OVERLAY, "value dropdown refused: values disabled");
            return false;
        }
        if !self.state.value_open() {
            self.state.primary = PrimaryOverlay::ValueOpen;
            self.cancel_focus(timers);
            self.focus_timer = Some(timers.start_one_shot_at(now, FOCUS_DELAY));
            tracing::debug!(target: targets::OVERLAY, "value dropdown opened");
        }
        self.sync_watch();
        true
    }

    /// Close the value dropdown if open.
    pub fn close_value(&mut self, timers: &mut TimerManager) -> bool {
        if !self.state.value_open() {
            return false;
        }
        self.state.primary = PrimaryOverlay::Closed;
        self.cancel_focus(timers);
        self.sync_watch();
        tracing::debug!(target: targets::OVERLAY, "value dropdown closed");
        true
    }

    /// Toggle the value dropdown. Returns whether it is now open.
    pub fn toggle_value(
        &mut self,
        timers: &mut TimerManager,
        now: Instant,
        values_disabled: bool,
    ) -> bool {
        if self.state.value_open() {
            self.close_value(timers);
            false
        } else {
            self.open_value(timers, now, values_disabled)
        }
    }

    /// Toggle the mode menu, always closing the value dropdown.
    pub fn toggle_mode_menu(&mut self, timers: &mut TimerManager) -> bool {
        let open = !self.state.mode_menu_open();
        self.cancel_focus(timers);
        self.state.primary = if open {
            PrimaryOverlay::ModeMenuOpen
        } else {
            PrimaryOverlay::Closed
        };
        self.sync_watch();
        tracing::debug!(target: targets::OVERLAY, open, "mode menu toggled");
        open
    }

    /// Close the mode menu if open.
    pub fn close_mode_menu(&mut self) -> bool {
        if !self.state.mode_menu_open() {
            return false;
        }
        self.state.primary = PrimaryOverlay::Closed;
        self.sync_watch();
        true
    }

    /// Show the expanded-selection flyout.
    pub fn show_flyout(&mut self) {
        if !self.state.flyout {
            self.state.flyout = true;
            self.sync_watch();
        }
    }

    /// Hide the expanded-selection flyout.
    pub fn hide_flyout(&mut self) -> bool {
        if !self.state.flyout {
            return false;
        }
        self.state.flyout = false;
        self.sync_watch();
        true
    }

    /// Apply a pointer press at `position`.
    pub fn handle_pointer_down(
        &mut self,
        timers: &mut TimerManager,
        position: Point,
        layout: &WidgetLayout,
    ) -> OutsideClickEffect {
        let mut effect = OutsideClickEffect::default();

        if !layout.root.contains(position) {
            effect.closed_value = self.state.value_open();
            if effect.closed_value {
                self.state.primary = PrimaryOverlay::Closed;
                self.cancel_focus(timers);
            }
            effect.closed_flyout = std::mem::take(&mut self.state.flyout);
        }

        if self.state.mode_menu_open() && !layout.mode_menu_area().contains(position) {
            self.state.primary = PrimaryOverlay::Closed;
            effect.closed_mode_menu = true;
            effect.closed_flyout |= std::mem::take(&mut self.state.flyout);
        }

        if effect.any() {
            tracing::debug!(target: targets::OVERLAY, ?effect, "outside press closed overlays");
            self.sync_watch();
        }
        effect
    }

    /// Claim a fired timer. Returns `true` when the search input should be
    /// focused now.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.focus_timer != Some(id) {
            return false;
        }
        self.focus_timer = None;
        self.state.value_open()
    }

    /// Drain presses queued by the pointer source.
    pub fn drain_pointer_events(&self) -> Vec<PointerDown> {
        self.watch.drain()
    }

    /// Close everything and release the pointer subscription.
    pub fn shutdown(&mut self, timers: &mut TimerManager) {
        self.cancel_focus(timers);
        self.state = OverlayState::default();
        self.watch.disarm();
    }

    fn cancel_focus(&mut self, timers: &mut TimerManager) {
        if let Some(id) = self.focus_timer.take() {
            let _ = timers.stop(id);
        }
    }

    fn sync_watch(&mut self) {
        if self.state.any_open() {
            self.watch.arm();
        } else {
            self.watch.disarm();
        }
    }
}
