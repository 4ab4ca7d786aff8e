use serde::{Deserialize, Serialize};

use crate::state::infinite::InfiniteScrollOptions;
use crate::state::virtualizer::VirtualizerOptions;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Normal,
    Comfortable,
}

impl Density {
    /// Row height estimate in pixels, used until rows are measured.
    pub fn row_height(self) -> f64 {
        match self {
            Self::Compact => 32.0,
            Self::Normal => 40.0,
            Self::Comfortable => 52.0,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Compact => "density-compact",
            Self::Normal => "density-normal",
            Self::Comfortable => "density-comfortable",
        }
    }
}

/// Presentation settings for one table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub density: Density,
    pub virtualize: bool,
    pub overscan: usize,
    /// Placeholder rows shown while the first page loads.
    pub skeleton_rows: usize,
    pub infinite_scroll: InfiniteScrollOptions,
    /// Namespace for persisted column, group and filter state. Nothing is
    /// persisted without it.
    pub persistence_key: Option<String>,
    pub persist_filters: bool,
    pub initial_expanded: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            density: Density::Normal,
            virtualize: false,
            overscan: 5,
            skeleton_rows: 5,
            infinite_scroll: InfiniteScrollOptions::default(),
            persistence_key: None,
            persist_filters: false,
            initial_expanded: true,
        }
    }
}

impl TableConfig {
    /// Parses a JSON config. Anything unreadable yields the defaults.
    pub fn from_json(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|err| {
            log::warn!("invalid table config, using defaults: {err}");
            Self::default()
        })
    }

    pub fn virtualizer_options(&self, count: usize) -> VirtualizerOptions {
        VirtualizerOptions {
            count,
            estimate_size: self.density.row_height(),
            overscan: self.overscan,
            enabled: self.virtualize,
        }
    }
}
