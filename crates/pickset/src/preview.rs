//! Hover preview placement.
//!
//! Hovering a row or tag shows a floating preview of the item beside the
//! widget. The preview goes on whichever side of the widget has more room
//! in the viewport. While the value dropdown is open the preview is pushed
//! past the dropdown's edge instead of the widget's, so the two never
//! overlap.

use pickset_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};

/// Gap between the preview and whatever it is placed beside.
pub const PREVIEW_GAP: f32 = 12.0;

/// Width of the value dropdown panel.
pub const DROPDOWN_WIDTH: f32 = 300.0;

/// Which side of the widget the preview renders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewSide {
    Left,
    Right,
}

/// Where a preview panel goes relative to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewPlacement {
    pub side: PreviewSide,
    /// Distance from the widget's anchoring edge to the panel's near edge.
    ///
    /// The anchoring edge is the widget's right edge for [`PreviewSide::Left`]
    /// and its left edge for [`PreviewSide::Right`].
    pub offset: f32,
    /// Whether the dropdown was open when the placement was computed.
    pub dropdown_open: bool,
    root: Rect,
}

impl PreviewPlacement {
    /// Choose a side and offset for the widget at `root` inside `viewport`.
    ///
    /// Ties go to the right.
    pub fn compute(root: Rect, viewport: Rect, dropdown_open: bool) -> Self {
        let space_left = root.left() - viewport.left();
        let space_right = viewport.right() - root.right();
        let side = if space_left > space_right {
            PreviewSide::Left
        } else {
            PreviewSide::Right
        };
        let offset = if dropdown_open {
            DROPDOWN_WIDTH + PREVIEW_GAP
        } else {
            root.width() + PREVIEW_GAP
        };

        tracing::trace!(
            target: targets::PREVIEW,
            ?side,
            space_left,
            space_right,
            offset,
            "preview placed"
        );

        Self {
            side,
            offset,
            dropdown_open,
            root,
        }
    }

    /// The panel rectangle for a preview of the given size.
    ///
    /// Panels are top-aligned with the widget.
    pub fn panel_rect(&self, panel: Size) -> Rect {
        let x = match self.side {
            PreviewSide::Left => self.root.right() - self.offset - panel.width,
            PreviewSide::Right => self.root.left() + self.offset,
        };
        Rect::new(x, self.root.top(), panel.width, panel.height)
    }
}

/// The single item currently previewed.
#[derive(Debug, Clone)]
pub struct HoverPreview<T> {
    current: Option<(T, PreviewPlacement)>,
}

impl<T> Default for HoverPreview<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T> HoverPreview<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `item`, replacing any previous preview.
    pub fn enter(&mut self, item: T, placement: PreviewPlacement) {
        self.current = Some((item, placement));
    }

    /// Clear the preview.
    pub fn leave(&mut self) {
        self.current = None;
    }

    pub fn item(&self) -> Option<&T> {
        self.current.as_ref().map(|(item, _)| item)
    }

    pub fn placement(&self) -> Option<PreviewPlacement> {
        self.current.as_ref().map(|(_, placement)| *placement)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}
