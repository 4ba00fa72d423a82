//! Widget configuration.
//!
//! A [`FilterConfig`] is built once per widget and never mutated afterwards.
//! It can be assembled with `with_*` builder methods or parsed from TOML:
//!
//! ```
//! use pickset::FilterConfig;
//!
//! let config = FilterConfig::from_toml_str(r#"
//!     label = "SKU"
//!     placeholder = "Pick SKUs..."
//!     max_tag_count = 2
//!
//!     [toggles]
//!     show_stock = false
//! "#).unwrap();
//!
//! assert_eq!(config.max_tag_count, 2);
//! assert!(!config.toggles.show_stock);
//! assert!(config.toggles.show_image);
//! ```
//!
//! Unknown keys are ignored. Out-of-range numbers are clamped rather than
//! rejected: a negative `max_tag_count` becomes 0 and a `page_size` below 1
//! becomes 1.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mode::FilterMode;

/// Default number of tags shown before the "+N" indicator.
pub const DEFAULT_MAX_TAG_COUNT: usize = 3;

/// Default page size for incremental loading.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("failed to parse filter config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Optional fields shown by item-specific renderers.
///
/// The engine itself never reads these; they are passed through to the
/// render strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToggles {
    pub show_image: bool,
    pub show_stock: bool,
    pub show_spu: bool,
    pub show_sku_count: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            show_image: true,
            show_stock: true,
            show_spu: true,
            show_sku_count: true,
        }
    }
}

/// Display labels for the four filter modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeLabels {
    pub include: String,
    pub exclude: String,
    pub empty: String,
    pub not_empty: String,
}

impl ModeLabels {
    /// The label for one mode.
    pub fn get(&self, mode: FilterMode) -> &str {
        match mode {
            FilterMode::Include => &self.include,
            FilterMode::Exclude => &self.exclude,
            FilterMode::Empty => &self.empty,
            FilterMode::NotEmpty => &self.not_empty,
        }
    }
}

impl Default for ModeLabels {
    fn default() -> Self {
        Self {
            include: FilterMode::Include.label().to_string(),
            exclude: FilterMode::Exclude.label().to_string(),
            empty: FilterMode::Empty.label().to_string(),
            not_empty: FilterMode::NotEmpty.label().to_string(),
        }
    }
}

/// Immutable per-widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterConfig {
    /// Caption shown above the control.
    pub label: String,
    /// Text shown when nothing is selected.
    pub placeholder: String,
    /// Maximum number of inline tags.
    pub max_tag_count: usize,
    /// Items requested per page.
    pub page_size: usize,
    /// Renderer toggles.
    pub toggles: DisplayToggles,
    /// Mode menu labels.
    pub mode_labels: ModeLabels,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            placeholder: String::new(),
            max_tag_count: DEFAULT_MAX_TAG_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            toggles: DisplayToggles::default(),
            mode_labels: ModeLabels::default(),
        }
    }
}

/// Wire shape accepting signed numbers so malformed values can be clamped.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    label: Option<String>,
    placeholder: Option<String>,
    max_tag_count: Option<i64>,
    page_size: Option<i64>,
    toggles: Option<DisplayToggles>,
    mode_labels: Option<ModeLabels>,
}

impl From<RawConfig> for FilterConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = FilterConfig::default();
        Self {
            label: raw.label.unwrap_or(defaults.label),
            placeholder: raw.placeholder.unwrap_or(defaults.placeholder),
            max_tag_count: raw
                .max_tag_count
                .map_or(defaults.max_tag_count, clamp_tag_count),
            page_size: raw.page_size.map_or(defaults.page_size, clamp_page_size),
            toggles: raw.toggles.unwrap_or(defaults.toggles),
            mode_labels: raw.mode_labels.unwrap_or(defaults.mode_labels),
        }
    }
}

fn clamp_tag_count(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

fn clamp_page_size(value: i64) -> usize {
    usize::try_from(value.max(1)).unwrap_or(usize::MAX)
}

impl<'de> Deserialize<'de> for FilterConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawConfig::deserialize(deserializer).map(Self::from)
    }
}

impl FilterConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Set the caption using builder pattern.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the empty-state text using builder pattern.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the inline tag cap using builder pattern.
    ///
    /// Negative values clamp to 0.
    pub fn with_max_tag_count(mut self, count: i64) -> Self {
        self.max_tag_count = clamp_tag_count(count);
        self
    }

    /// Set the page size using builder pattern.
    ///
    /// Values below 1 clamp to 1.
    pub fn with_page_size(mut self, size: i64) -> Self {
        self.page_size = clamp_page_size(size);
        self
    }

    /// Set the renderer toggles using builder pattern.
    pub fn with_toggles(mut self, toggles: DisplayToggles) -> Self {
        self.toggles = toggles;
        self
    }

    /// Set the mode labels using builder pattern.
    pub fn with_mode_labels(mut self, labels: ModeLabels) -> Self {
        self.mode_labels = labels;
        self
    }
}
