//! View model produced by a filter widget.
//!
//! A [`FilterView`] is a snapshot of everything the host needs to draw the
//! widget for one frame. Item visuals come from the widget's render
//! strategy; the rest are plain values.

use serde::Serialize;

use crate::mode::FilterMode;

/// Text shown when a query matched nothing.
pub const NO_MATCH_TEXT: &str = "No matching records";

/// Select-all label while no query has been entered.
pub const SELECT_ALL_SEARCH_FIRST: &str = "Select all (search first)";

/// Select-all label once a query has been entered.
pub const SELECT_ALL_RESULTS: &str = "Select all current results";

/// State of the item list area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    /// A fetch is in flight and nothing is loaded yet.
    Loading,
    /// A fetch is in flight on top of loaded items.
    LoadingMore,
    /// Nothing matched.
    Empty,
    /// Items are loaded and idle.
    Ready,
}

impl ListStatus {
    /// Text the host should show for this status, if any.
    pub fn text(self) -> Option<&'static str> {
        match self {
            ListStatus::Empty => Some(NO_MATCH_TEXT),
            _ => None,
        }
    }
}

/// The "select all current results" toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectAllState {
    pub enabled: bool,
    pub checked: bool,
    pub label: &'static str,
}

/// One entry of the mode menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeOption {
    pub mode: FilterMode,
    pub label: String,
    pub active: bool,
}

/// A rendered selected-item tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TagView<Id, O> {
    pub id: Id,
    pub output: O,
}

/// A rendered list row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView<Id, O> {
    pub id: Id,
    pub selected: bool,
    pub output: O,
}

/// The open value dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownView<Id, O> {
    /// The text in the search box.
    pub query: String,
    /// Whether the clear-query button is shown.
    pub show_clear_query: bool,
    pub select_all: SelectAllState,
    pub selected_count: usize,
    /// Whether the "clear selection" action is shown.
    pub show_clear_selection: bool,
    pub rows: Vec<RowView<Id, O>>,
    pub status: ListStatus,
}

/// The expanded-selection flyout.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyoutView<Id, O> {
    pub title: String,
    pub tags: Vec<TagView<Id, O>>,
}

/// Everything needed to draw a filter widget.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterView<Id, O> {
    pub label: String,
    pub mode: FilterMode,
    pub mode_label: String,
    /// Whether the value area is disabled by the mode.
    pub values_disabled: bool,
    /// Shown instead of tags when nothing is selected.
    pub empty_text: Option<String>,
    pub tags: Vec<TagView<Id, O>>,
    /// Count for the "+N" indicator.
    pub hidden_count: usize,
    pub mode_menu: Option<Vec<ModeOption>>,
    pub dropdown: Option<DropdownView<Id, O>>,
    pub flyout: Option<FlyoutView<Id, O>>,
    pub preview: Option<O>,
}

/// A serializable summary of the widget's value, for host debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutput<Id> {
    pub mode: FilterMode,
    pub count: usize,
    pub ids: Vec<Id>,
}
