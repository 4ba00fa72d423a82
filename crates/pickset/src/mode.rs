//! Filter mode state.
//!
//! The mode is the logical relation the host applies to the selection.
//! `Empty` and `NotEmpty` ignore the selected values entirely, so entering
//! either one clears the selection as part of the same transition.

use std::fmt;

use pickset_core::logging::targets;
use pickset_core::Property;
use serde::{Deserialize, Serialize};

/// How the selection is applied to the host's query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Match records whose value is one of the selected items.
    #[default]
    Include,
    /// Match records whose value is none of the selected items.
    Exclude,
    /// Match records with no value.
    Empty,
    /// Match records with any value.
    NotEmpty,
}

impl FilterMode {
    /// Every mode, in menu order.
    pub const ALL: [FilterMode; 4] = [
        FilterMode::Include,
        FilterMode::Exclude,
        FilterMode::Empty,
        FilterMode::NotEmpty,
    ];

    /// Whether this mode ignores selected values.
    ///
    /// The value picker is disabled and the selection kept empty.
    pub fn disables_values(self) -> bool {
        matches!(self, FilterMode::Empty | FilterMode::NotEmpty)
    }

    /// The default English label.
    pub fn label(self) -> &'static str {
        match self {
            FilterMode::Include => "Include",
            FilterMode::Exclude => "Exclude",
            FilterMode::Empty => "Is empty",
            FilterMode::NotEmpty => "Is not empty",
        }
    }

    /// The wire name (`include`, `exclude`, `empty`, `not_empty`).
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::Include => "include",
            FilterMode::Exclude => "exclude",
            FilterMode::Empty => "empty",
            FilterMode::NotEmpty => "not_empty",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of choosing a mode from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub previous: FilterMode,
    pub current: FilterMode,
    /// The selection must be emptied in the same transition.
    pub clears_selection: bool,
}

impl ModeTransition {
    /// Whether the mode value actually changed.
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Holds the widget's current mode.
#[derive(Debug, Default)]
pub struct FilterModeState {
    mode: Property<FilterMode>,
}

impl FilterModeState {
    /// Create the state in [`FilterMode::Include`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the state in a given mode.
    pub fn with_mode(mode: FilterMode) -> Self {
        Self {
            mode: Property::new(mode),
        }
    }

    /// The current mode.
    pub fn mode(&self) -> FilterMode {
        self.mode.get()
    }

    /// Whether the value picker is currently disabled.
    pub fn values_disabled(&self) -> bool {
        self.mode().disables_values()
    }

    /// Choose a mode.
    ///
    /// Choosing a value-less mode always requests a clear, even when the
    /// mode is unchanged.
    pub fn select(&self, mode: FilterMode) -> ModeTransition {
        let previous = self.mode.replace(mode).unwrap_or(mode);
        let transition = ModeTransition {
            previous,
            current: mode,
            clears_selection: mode.disables_values(),
        };
        tracing::debug!(
            target: targets::MODE,
            from = %transition.previous,
            to = %transition.current,
            clears_selection = transition.clears_selection,
            "filter mode selected"
        );
        transition
    }
}
