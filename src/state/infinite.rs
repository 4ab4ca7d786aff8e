use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfiniteScrollOptions {
    pub enabled: bool,
    /// Fraction of the sentinel that must be visible, 0.0 to 1.0.
    pub threshold: f64,
    /// Extra distance in pixels below the viewport that still counts as
    /// visible.
    pub root_margin: f64,
}

impl Default for InfiniteScrollOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.1,
            root_margin: 100.0,
        }
    }
}

/// Decides when the sentinel after the last row should trigger a page
/// fetch. Knows nothing about pages, only whether more exist and whether a
/// fetch is running.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InfiniteScroll {
    options: InfiniteScrollOptions,
    has_next_page: bool,
    is_fetching: bool,
    state: FetchState,
    /// The caller has reported the fetch we started as running.
    fetch_seen: bool,
    /// Row count last reported through [`InfiniteScroll::sync_rows`].
    row_count: Option<usize>,
}

impl InfiniteScroll {
    pub fn new(options: InfiniteScrollOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &InfiniteScrollOptions {
        &self.options
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    /// A disabled observer never triggers and drops any pending state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
        if !enabled {
            self.state = FetchState::Idle;
            self.fetch_seen = false;
        }
    }

    /// Takes the caller's latest flags. Once a fetch has been reported as
    /// running, reporting `is_fetching == false` returns the observer to
    /// idle. A change of `has_next_page` while not fetching also settles,
    /// since it can only come from a completed fetch.
    pub fn sync(&mut self, has_next_page: bool, is_fetching: bool) {
        let page_flag_changed = self.has_next_page != has_next_page;
        self.has_next_page = has_next_page;
        self.is_fetching = is_fetching;
        if self.state == FetchState::Fetching && !is_fetching && page_flag_changed {
            self.settle();
            return;
        }
        match (self.state, is_fetching) {
            (FetchState::Fetching, true) => self.fetch_seen = true,
            // Flags captured before the caller saw our request still say
            // "not fetching"; only a settled fetch returns to idle.
            (FetchState::Fetching, false) if self.fetch_seen => {
                log::debug!("page fetch settled, has_next_page={has_next_page}");
                self.state = FetchState::Idle;
                self.fetch_seen = false;
            }
            (FetchState::Idle, true) => {
                self.state = FetchState::Fetching;
                self.fetch_seen = true;
            }
            _ => {}
        }
    }

    /// Takes the caller's current row count. New rows arriving while the
    /// caller is not fetching mean the requested page landed, even if
    /// `is_fetching` was never seen as true.
    pub fn sync_rows(&mut self, row_count: usize) {
        let previous = self.row_count.replace(row_count);
        let changed = previous.is_some_and(|previous| previous != row_count);
        if changed && self.state == FetchState::Fetching && !self.is_fetching {
            log::debug!("rows changed to {row_count}, page fetch settled");
            self.settle();
        }
    }

    /// Forces the observer back to idle, for callers whose fetch completes
    /// without ever reporting `is_fetching`.
    pub fn settle(&mut self) {
        self.state = FetchState::Idle;
        self.fetch_seen = false;
    }

    /// Handles one sentinel intersection report. Returns true when the
    /// caller should fetch the next page now.
    pub fn on_intersect(&mut self, ratio: f64) -> bool {
        if !self.options.enabled || ratio <= 0.0 || ratio < self.options.threshold {
            return false;
        }
        if !self.has_next_page || self.is_fetching || self.state == FetchState::Fetching {
            return false;
        }
        self.state = FetchState::Fetching;
        self.fetch_seen = false;
        log::debug!("sentinel visible ({ratio:.2}), fetching next page");
        true
    }

    /// Runs `fetch_next_page` when the intersection calls for it.
    pub fn observe(&mut self, ratio: f64, fetch_next_page: impl FnOnce()) -> bool {
        let trigger = self.on_intersect(ratio);
        if trigger {
            fetch_next_page();
        }
        trigger
    }

    /// Sentinel visibility computed from the scroll container's metrics,
    /// with the sentinel sitting at the very end of the content.
    pub fn sentinel_ratio(&self, metrics: ScrollMetrics, sentinel_height: f64) -> f64 {
        sentinel_ratio(metrics, sentinel_height, self.options.root_margin)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

pub fn sentinel_ratio(metrics: ScrollMetrics, sentinel_height: f64, root_margin: f64) -> f64 {
    if metrics.client_height <= 0.0 {
        return 0.0;
    }
    let sentinel_height = sentinel_height.max(1.0);
    let sentinel_top = metrics.scroll_height - sentinel_height;
    let visible_bottom = metrics.scroll_top + metrics.client_height + root_margin.max(0.0);
    let overlap = (visible_bottom - sentinel_top).clamp(0.0, sentinel_height);
    overlap / sentinel_height
}
