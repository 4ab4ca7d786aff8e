//! Row windowing for long tables.
//!
//! Only rows inside the viewport (plus `overscan` on either side) are
//! rendered. Unmeasured rows are assumed to be `estimate_size` tall; once a
//! row reports its real height through [`Virtualizer::measure`] every offset
//! after it shifts accordingly.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualizerOptions {
    pub count: usize,
    pub estimate_size: f64,
    pub overscan: usize,
    pub enabled: bool,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            count: 0,
            estimate_size: 40.0,
            overscan: 5,
            enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualItem {
    pub index: usize,
    pub start: f64,
    pub size: f64,
    pub end: f64,
}

#[derive(Debug, PartialEq)]
pub struct VisibleRow<'a, T> {
    pub item: &'a T,
    pub index: usize,
    pub virtual_item: VirtualItem,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    /// Scroll only as far as needed to bring the row into view.
    #[default]
    Auto,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Virtualizer {
    options: VirtualizerOptions,
    scroll_offset: f64,
    viewport_size: f64,
    measured: BTreeMap<usize, f64>,
}

impl Virtualizer {
    pub fn new(options: VirtualizerOptions) -> Self {
        Self {
            options,
            scroll_offset: 0.0,
            viewport_size: 0.0,
            measured: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &VirtualizerOptions {
        &self.options
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn set_count(&mut self, count: usize) {
        if count == self.options.count {
            return;
        }
        self.options.count = count;
        self.measured.retain(|index, _| *index < count);
        self.scroll_offset = self.clamp_offset(self.scroll_offset);
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn viewport_size(&self) -> f64 {
        self.viewport_size
    }

    /// Records the scroll container's height. Negative or NaN heights are
    /// treated as zero.
    pub fn set_viewport(&mut self, height: f64) {
        self.viewport_size = if height.is_finite() { height.max(0.0) } else { 0.0 };
    }

    /// Records the container's scroll position as reported by the renderer.
    pub fn on_scroll(&mut self, offset: f64) {
        self.scroll_offset = self.clamp_offset(offset);
    }

    pub fn scroll_to_offset(&mut self, offset: f64) {
        self.scroll_offset = self.clamp_offset(offset);
    }

    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) {
        if self.options.count == 0 {
            return;
        }
        let index = index.min(self.options.count - 1);
        let start = self.start_of(index);
        let size = self.size_of(index);
        let end = start + size;
        let viewport = self.viewport_size;

        let target = match align {
            ScrollAlign::Start => start,
            ScrollAlign::End => end - viewport,
            ScrollAlign::Center => start - (viewport - size) / 2.0,
            ScrollAlign::Auto => {
                if start < self.scroll_offset {
                    start
                } else if end > self.scroll_offset + viewport {
                    end - viewport
                } else {
                    self.scroll_offset
                }
            }
        };
        self.scroll_offset = self.clamp_offset(target);
    }

    /// Stores the rendered height of row `index`.
    pub fn measure(&mut self, index: usize, size: f64) {
        if index >= self.options.count || !size.is_finite() || size < 0.0 {
            return;
        }
        self.measured.insert(index, size);
    }

    pub fn size_of(&self, index: usize) -> f64 {
        self.measured
            .get(&index)
            .copied()
            .unwrap_or(self.options.estimate_size)
    }

    pub fn start_of(&self, index: usize) -> f64 {
        let estimate = self.options.estimate_size;
        let correction: f64 = self
            .measured
            .range(..index)
            .map(|(_, size)| size - estimate)
            .sum();
        index as f64 * estimate + correction
    }

    pub fn total_size(&self) -> f64 {
        self.start_of(self.options.count)
    }

    /// Index range to render, overscan included. Empty for a zero-height
    /// viewport or an empty list.
    pub fn range(&self) -> Range<usize> {
        let count = self.options.count;
        if count == 0 {
            return 0..0;
        }
        if !self.options.enabled {
            return 0..count;
        }
        if self.viewport_size <= 0.0 {
            return 0..0;
        }

        let top = self.scroll_offset;
        let bottom = top + self.viewport_size;
        let first = self.index_at(top);
        let mut last = first;
        while last + 1 < count && self.start_of(last + 1) < bottom {
            last += 1;
        }

        let start = first.saturating_sub(self.options.overscan);
        let end = (last + 1 + self.options.overscan).min(count);
        start..end
    }

    pub fn virtual_items(&self) -> Vec<VirtualItem> {
        self.range().map(|index| self.item(index)).collect()
    }

    /// Space above the first rendered row.
    pub fn padding_top(&self) -> f64 {
        if !self.options.enabled {
            return 0.0;
        }
        let range = self.range();
        if range.is_empty() {
            return 0.0;
        }
        self.start_of(range.start)
    }

    /// Space below the last rendered row, so that rendered rows plus both
    /// paddings add up to [`Virtualizer::total_size`].
    pub fn padding_bottom(&self) -> f64 {
        if !self.options.enabled {
            return 0.0;
        }
        let range = self.range();
        if range.is_empty() {
            return self.total_size();
        }
        (self.total_size() - self.start_of(range.end)).max(0.0)
    }

    /// Pairs each rendered row of `data` with its layout slot. With
    /// virtualization off every row comes back.
    pub fn visible_data<'a, T>(&self, data: &'a [T]) -> Vec<VisibleRow<'a, T>> {
        let range = if self.options.enabled {
            let range = self.range();
            range.start.min(data.len())..range.end.min(data.len())
        } else {
            0..data.len()
        };

        range
            .map(|index| VisibleRow {
                item: &data[index],
                index,
                virtual_item: self.item(index),
            })
            .collect()
    }

    fn item(&self, index: usize) -> VirtualItem {
        let start = self.start_of(index);
        let size = self.size_of(index);
        VirtualItem {
            index,
            start,
            size,
            end: start + size,
        }
    }

    /// First row whose bottom edge lies below `offset`.
    fn index_at(&self, offset: f64) -> usize {
        let count = self.options.count;
        let (mut lo, mut hi) = (0usize, count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.start_of(mid) + self.size_of(mid) <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo.min(count.saturating_sub(1))
    }

    fn clamp_offset(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return 0.0;
        }
        let max = (self.total_size() - self.viewport_size).max(0.0);
        offset.clamp(0.0, max)
    }
}
