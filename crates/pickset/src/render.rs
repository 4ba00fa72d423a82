//! Item render strategies.
//!
//! The engine is generic over the item type and knows nothing about how an
//! item looks. Each item kind supplies an [`ItemRenderer`] that turns an
//! item plus a small context into whatever the host displays: a string, a
//! UI node, a draw list. The widget's view model carries those outputs.

use std::fmt;

use crate::config::DisplayToggles;
use crate::preview::{PreviewPlacement, PreviewSide};

/// Context for rendering a selected-item tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagContext {
    /// Whether the tag shows a delete affordance.
    pub removable: bool,
    pub toggles: DisplayToggles,
}

/// Context for rendering a row in the item list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowContext<'a> {
    pub selected: bool,
    /// The current search text, for highlighting.
    pub query: &'a str,
    pub toggles: DisplayToggles,
}

/// Context for rendering the hover preview panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewContext {
    pub placement: PreviewPlacement,
    pub toggles: DisplayToggles,
}

impl PreviewContext {
    pub fn side(&self) -> PreviewSide {
        self.placement.side
    }

    pub fn dropdown_open(&self) -> bool {
        self.placement.dropdown_open
    }
}

/// Turns items into displayable output.
pub trait ItemRenderer<T>: Send + Sync {
    /// What the renderer produces.
    type Output;

    fn render_tag(&self, item: &T, ctx: &TagContext) -> Self::Output;

    fn render_row(&self, item: &T, ctx: &RowContext<'_>) -> Self::Output;

    fn render_preview(&self, item: &T, ctx: &PreviewContext) -> Self::Output;
}

type TagFn<T, O> = Box<dyn Fn(&T, &TagContext) -> O + Send + Sync>;
type RowFn<T, O> = Box<dyn Fn(&T, &RowContext<'_>) -> O + Send + Sync>;
type PreviewFn<T, O> = Box<dyn Fn(&T, &PreviewContext) -> O + Send + Sync>;

/// An [`ItemRenderer`] built from three closures.
///
/// ```
/// use pickset::render::{FnRenderer, ItemRenderer, RowContext};
/// use pickset::DisplayToggles;
///
/// let renderer = FnRenderer::new(
///     |name: &String, _| format!("[{name}]"),
///     |name: &String, ctx| format!("{} {name}", if ctx.selected { "x" } else { " " }),
///     |name: &String, _| name.to_uppercase(),
/// );
///
/// let ctx = RowContext { selected: true, query: "", toggles: DisplayToggles::default() };
/// assert_eq!(renderer.render_row(&"gel".to_string(), &ctx), "x gel");
/// ```
pub struct FnRenderer<T, O> {
    tag: TagFn<T, O>,
    row: RowFn<T, O>,
    preview: PreviewFn<T, O>,
}

impl<T, O> FnRenderer<T, O> {
    pub fn new<FT, FR, FP>(tag: FT, row: FR, preview: FP) -> Self
    where
        FT: Fn(&T, &TagContext) -> O + Send + Sync + 'static,
        FR: Fn(&T, &RowContext<'_>) -> O + Send + Sync + 'static,
        FP: Fn(&T, &PreviewContext) -> O + Send + Sync + 'static,
    {
        Self {
            tag: Box::new(tag),
            row: Box::new(row),
            preview: Box::new(preview),
        }
    }
}

impl<T, O> ItemRenderer<T> for FnRenderer<T, O> {
    type Output = O;

    fn render_tag(&self, item: &T, ctx: &TagContext) -> O {
        (self.tag)(item, ctx)
    }

    fn render_row(&self, item: &T, ctx: &RowContext<'_>) -> O {
        (self.row)(item, ctx)
    }

    fn render_preview(&self, item: &T, ctx: &PreviewContext) -> O {
        (self.preview)(item, ctx)
    }
}

impl<T, O> fmt::Debug for FnRenderer<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRenderer").finish_non_exhaustive()
    }
}
