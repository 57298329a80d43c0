use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::offsets::RowOffsets;
use crate::{Align, Rect, RowRange, RowVirtualizerOptions, ScrollDirection, VirtualRow};

/// A headless window virtualizer over a row partition.
///
/// The virtualizer never sees items, only row indices: the partition decides
/// which items a row holds, this type decides which rows intersect the
/// viewport and where they sit. It is UI-agnostic; an adapter drives it by
/// providing viewport geometry, scroll offsets, and row measurements as rows
/// render.
///
/// Row heights start as estimates and are replaced by real measurements via
/// [`RowVirtualizer::measure`]. Measuring row `i` never moves rows `<= i`;
/// when row `i` sits above the current scroll offset, the offset itself is
/// compensated by the height delta so content the user has already scrolled
/// past does not visually jump.
#[derive(Clone, Debug)]
pub struct RowVirtualizer {
    options: RowVirtualizerOptions,
    viewport_size: u32,
    scroll_offset: u64,
    scroll_rect: Rect,
    is_scrolling: bool,
    scroll_direction: Option<ScrollDirection>,
    last_scroll_event_ms: Option<u64>,

    heights: Vec<u32>, // base heights (no gap)
    measured: Vec<bool>,
    sums: RowOffsets,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl RowVirtualizer {
    pub fn new(options: RowVirtualizerOptions) -> Self {
        let scroll_rect = options.initial_rect.unwrap_or_default();
        let scroll_offset = options.initial_offset.resolve();
        gdebug!(
            row_count = options.row_count,
            enabled = options.enabled,
            overscan = options.overscan,
            "RowVirtualizer::new"
        );
        let mut v = Self {
            viewport_size: scroll_rect.main,
            scroll_offset,
            scroll_rect,
            is_scrolling: false,
            scroll_direction: None,
            last_scroll_event_ms: None,
            heights: Vec::new(),
            measured: Vec::new(),
            sums: RowOffsets::new(0),
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        v.rebuild_estimates();
        v
    }

    pub fn options(&self) -> &RowVirtualizerOptions {
        &self.options
    }

    pub fn row_count(&self) -> usize {
        self.options.row_count
    }

    pub fn enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.options.enabled == enabled {
            return;
        }
        self.options.enabled = enabled;
        if !enabled {
            self.viewport_size = 0;
            self.scroll_offset = self.options.initial_offset.resolve();
            self.scroll_rect = Rect::default();
            self.is_scrolling = false;
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
        } else {
            self.scroll_offset = self.options.initial_offset.resolve();
            self.scroll_rect = self.options.initial_rect.unwrap_or_default();
            self.viewport_size = self.scroll_rect.main;
        }
        self.notify();
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&RowVirtualizer, bool) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| alloc::sync::Arc::new(f) as _);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.is_scrolling);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// On a typical frame an adapter updates the scroll rect, the scroll
    /// offset, and the scrolling flag together; without batching each setter
    /// would fire `on_change` separately.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    // --- scroll + viewport plumbing ---------------------------------------

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        if self.is_scrolling == is_scrolling {
            return;
        }
        self.is_scrolling = is_scrolling;
        if !is_scrolling {
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
        }
        self.notify();
    }

    pub fn notify_scroll_event(&mut self, now_ms: u64) {
        if !self.options.enabled {
            return;
        }
        self.last_scroll_event_ms = Some(now_ms);
        self.set_is_scrolling(true);
    }

    /// Debounces `is_scrolling` back to `false` once no scroll event has been
    /// seen for `is_scrolling_reset_delay_ms`. Call this from a frame tick.
    pub fn update_scrolling(&mut self, now_ms: u64) {
        if !self.options.enabled || !self.is_scrolling {
            return;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
            self.set_is_scrolling(false);
        }
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll_rect
    }

    pub fn set_scroll_rect(&mut self, rect: Rect) {
        if self.scroll_rect == rect {
            return;
        }
        self.scroll_rect = rect;
        self.viewport_size = rect.main;
        self.notify();
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        if self.viewport_size == size && self.scroll_rect.main == size {
            return;
        }
        self.viewport_size = size;
        self.scroll_rect.main = size;
        self.notify();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Scroll offset relative to the grid's own top (excludes `scroll_margin`).
    pub fn scroll_offset_in_grid(&self) -> u64 {
        let margin = self.options.scroll_margin as u64;
        self.scroll_offset.saturating_sub(margin)
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    /// Applies a scroll offset update from the UI layer (wheel/drag) and marks
    /// the virtualizer as scrolling.
    pub fn apply_scroll_offset_event(&mut self, offset: u64, now_ms: u64) {
        gtrace!(offset, now_ms, "apply_scroll_offset_event");
        self.batch_update(|v| {
            v.set_scroll_offset(offset);
            v.notify_scroll_event(now_ms);
        });
    }

    pub fn apply_scroll_offset_event_clamped(&mut self, offset: u64, now_ms: u64) {
        gtrace!(offset, now_ms, "apply_scroll_offset_event_clamped");
        self.batch_update(|v| {
            v.set_scroll_offset_clamped(offset);
            v.notify_scroll_event(now_ms);
        });
    }

    /// Applies scroll rect + offset in one coalesced update, the recommended
    /// entry point for adapters receiving scroll events with fresh geometry.
    pub fn apply_scroll_frame(&mut self, rect: Rect, scroll_offset: u64, now_ms: u64) {
        gtrace!(
            rect_main = rect.main,
            rect_cross = rect.cross,
            scroll_offset,
            now_ms,
            "apply_scroll_frame"
        );
        self.batch_update(|v| {
            v.set_scroll_rect(rect);
            v.set_scroll_offset(scroll_offset);
            v.notify_scroll_event(now_ms);
        });
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|v| {
            v.set_viewport_size(viewport_size);
            v.set_scroll_offset(scroll_offset);
        });
    }

    pub fn set_viewport_and_scroll_clamped(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|v| {
            v.set_viewport_size(viewport_size);
            v.set_scroll_offset_clamped(scroll_offset);
        });
    }

    // --- row count + measurements -----------------------------------------

    /// Updates the row count, preserving measurements of rows that survive.
    ///
    /// Growing appends estimated rows in `O(k log n)` for `k` new rows;
    /// shrinking truncates. This is the append path for incremental
    /// pagination: new pages only ever add rows at the end.
    ///
    /// Note: if the previously-last row was partial and gained items, its
    /// measurement is stale; callers clear it via [`Self::reset_measurement`].
    pub fn set_row_count(&mut self, row_count: usize) {
        let prev = self.options.row_count;
        if prev == row_count {
            return;
        }
        gdebug!(prev, row_count, "set_row_count");
        self.options.row_count = row_count;
        let gap = self.options.gap as u64;

        if row_count < prev {
            self.heights.truncate(row_count);
            self.measured.truncate(row_count);
            self.sums.truncate(row_count);
            // The new last row no longer carries a trailing gap.
            if gap > 0 && row_count > 0 {
                self.sums.add(row_count - 1, -(gap as i64));
            }
        } else {
            // The old last row now carries a trailing gap.
            if gap > 0 && prev > 0 {
                self.sums.add(prev - 1, gap as i64);
            }
            self.heights.reserve(row_count - prev);
            self.measured.reserve(row_count - prev);
            for i in prev..row_count {
                let h = (self.options.estimate_height)(i);
                self.heights.push(h);
                self.measured.push(false);
                let mut extent = h as u64;
                if gap > 0 && i + 1 < row_count {
                    extent = extent.saturating_add(gap);
                }
                self.sums.push(extent);
            }
        }
        self.notify();
    }

    /// Records a measured height for a row, adjusting the scroll offset when
    /// the row lies before the current offset (prevents the rows the user is
    /// looking at from shifting as earlier rows are measured).
    ///
    /// Returns the scroll-offset delta that was applied (0 when none).
    pub fn measure(&mut self, index: usize, height: u32) -> i64 {
        if index >= self.options.row_count {
            return 0;
        }
        let row = self.row(index);
        let delta = self.set_row_height(index, height);
        if delta == 0 {
            self.notify();
            return 0;
        }
        gtrace!(index, height, delta, "measure");

        if row.start < self.scroll_offset {
            if delta > 0 {
                self.scroll_offset = self.scroll_offset.saturating_add(delta as u64);
            } else {
                self.scroll_offset = self.scroll_offset.saturating_sub((-delta) as u64);
            }
            self.notify();
            delta
        } else {
            self.notify();
            0
        }
    }

    /// Records a measured height without ever touching the scroll offset.
    pub fn measure_unadjusted(&mut self, index: usize, height: u32) {
        if index >= self.options.row_count {
            return;
        }
        self.set_row_height(index, height);
        self.notify();
    }

    fn set_row_height(&mut self, index: usize, height: u32) -> i64 {
        let cur = self.heights[index];
        self.measured[index] = true;
        if cur == height {
            return 0;
        }
        self.heights[index] = height;
        let delta = height as i64 - cur as i64;
        self.sums.add(index, delta);
        delta
    }

    /// Drops a single row's measurement back to its estimate (used when the
    /// last, partial row gains items from a newly appended page).
    pub fn reset_measurement(&mut self, index: usize) {
        if index >= self.options.row_count || !self.measured[index] {
            return;
        }
        let est = (self.options.estimate_height)(index);
        let cur = self.heights[index];
        self.heights[index] = est;
        self.measured[index] = false;
        self.sums.add(index, est as i64 - cur as i64);
        self.notify();
    }

    /// Drops all measurements and restarts from estimates.
    ///
    /// Required after a repartition: a column-count change moves row
    /// boundaries, so no prior measurement describes any current row.
    pub fn reset_measurements(&mut self) {
        gdebug!(row_count = self.options.row_count, "reset_measurements");
        self.rebuild_estimates();
        self.notify();
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
        self.notify();
    }

    pub fn set_padding(&mut self, padding_start: u32, padding_end: u32) {
        self.options.padding_start = padding_start;
        self.options.padding_end = padding_end;
        self.notify();
    }

    pub fn set_scroll_margin(&mut self, scroll_margin: u32) {
        self.options.scroll_margin = scroll_margin;
        self.notify();
    }

    pub fn set_gap(&mut self, gap: u32) {
        if self.options.gap == gap {
            return;
        }
        self.options.gap = gap;
        self.rebuild_offsets();
        self.notify();
    }

    // --- queries ------------------------------------------------------------

    /// Total scrollable height: paddings plus every row's height (measured
    /// where known, estimated otherwise) plus gaps.
    pub fn total_size(&self) -> u64 {
        if !self.options.enabled {
            return 0;
        }
        self.options.padding_start as u64 + self.sums.total() + self.options.padding_end as u64
    }

    /// The overscanned render range for the current scroll state.
    pub fn virtual_range(&self) -> RowRange {
        self.virtual_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn virtual_range_for(&self, scroll_offset: u64, viewport_size: u32) -> RowRange {
        if !self.options.enabled {
            return RowRange {
                start_row: 0,
                end_row: 0,
            };
        }
        let mut range = self.compute_visible_range(scroll_offset, viewport_size);
        if range.is_empty() {
            return range;
        }
        let overscan = self.options.overscan;
        range.start_row = range.start_row.saturating_sub(overscan);
        range.end_row = cmp::min(self.options.row_count, range.end_row.saturating_add(overscan));
        range
    }

    /// The strictly visible range (no overscan).
    pub fn visible_range(&self) -> RowRange {
        self.visible_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn visible_range_for(&self, scroll_offset: u64, viewport_size: u32) -> RowRange {
        if !self.options.enabled {
            return RowRange {
                start_row: 0,
                end_row: 0,
            };
        }
        self.compute_visible_range(scroll_offset, viewport_size)
    }

    /// Iterates the rows to render (visible + overscan) without allocating.
    pub fn for_each_virtual_row(&self, f: impl FnMut(VirtualRow)) {
        self.for_each_virtual_row_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_row_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(VirtualRow),
    ) {
        let range = self.virtual_range_for(scroll_offset, viewport_size);
        if range.is_empty() {
            return;
        }

        let margin = self.options.scroll_margin as u64;
        let mut start = margin.saturating_add(self.start_of(range.start_row));
        let gap = self.options.gap as u64;
        let count = self.options.row_count;

        for i in range.start_row..range.end_row {
            let height = self.heights[i];
            f(VirtualRow {
                index: i,
                start,
                height,
            });

            start = start.saturating_add(height as u64);
            if gap > 0 && i + 1 < count {
                start = start.saturating_add(gap);
            }
        }
    }

    /// Collects the rows to render into `out` (clears `out` first).
    ///
    /// Convenience wrapper around [`Self::for_each_virtual_row`]; adapters on
    /// a hot path should prefer the iteration form with a reused buffer.
    pub fn collect_virtual_rows(&self, out: &mut Vec<VirtualRow>) {
        out.clear();
        self.for_each_virtual_row(|row| out.push(row));
    }

    pub fn row_start(&self, index: usize) -> Option<u64> {
        if !self.options.enabled {
            return None;
        }
        (index < self.options.row_count).then(|| {
            let margin = self.options.scroll_margin as u64;
            margin.saturating_add(self.start_of(index))
        })
    }

    pub fn row_height(&self, index: usize) -> Option<u32> {
        if !self.options.enabled {
            return None;
        }
        self.heights.get(index).copied()
    }

    pub fn row_end(&self, index: usize) -> Option<u64> {
        let start = self.row_start(index)?;
        let height = self.row_height(index)? as u64;
        Some(start.saturating_add(height))
    }

    /// Maps an absolute scroll offset to the row index covering it.
    pub fn row_at_offset(&self, offset: u64) -> Option<usize> {
        if !self.options.enabled {
            return None;
        }
        let margin = self.options.scroll_margin as u64;
        if offset < margin {
            return (self.options.row_count > 0).then_some(0);
        }
        self.row_at_offset_in_grid(offset - margin)
            .filter(|&i| i < self.options.row_count)
    }

    pub fn max_scroll_offset(&self) -> u64 {
        if !self.options.enabled {
            return self.options.initial_offset.resolve();
        }
        let margin = self.options.scroll_margin as u64;
        let total = self.total_size();
        let view = self.viewport_size as u64;
        margin.saturating_add(total.saturating_sub(view))
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Programmatically scrolls to a row (no animation); returns the applied
    /// (clamped) offset. Does not mark the virtualizer as scrolling.
    pub fn scroll_to_row(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_row_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    pub fn scroll_to_row_offset(&self, index: usize, align: Align) -> u64 {
        if !self.options.enabled {
            return self.options.initial_offset.resolve();
        }
        if self.options.row_count == 0 {
            return 0;
        }
        let index = index.min(self.options.row_count - 1);
        let row = self.row(index);

        let sp_start = self.options.scroll_padding_start as u64;
        let sp_end = self.options.scroll_padding_end as u64;
        let view = self.viewport_size as u64;

        let target = match align {
            Align::Start => row.start.saturating_sub(sp_start),
            Align::End => row.end().saturating_add(sp_end).saturating_sub(view),
            Align::Center => {
                let center = row.start.saturating_add(row.height as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if row.start >= cur && row.end() <= cur_end {
                    cur
                } else if row.start < cur {
                    row.start.saturating_sub(sp_start)
                } else {
                    row.end().saturating_add(sp_end).saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    // --- internals ----------------------------------------------------------

    fn rebuild_estimates(&mut self) {
        let count = self.options.row_count;
        self.heights.clear();
        self.measured.clear();
        self.heights.reserve_exact(count);
        self.measured.reserve_exact(count);
        for i in 0..count {
            self.heights.push((self.options.estimate_height)(i));
            self.measured.push(false);
        }
        self.rebuild_offsets();
    }

    fn rebuild_offsets(&mut self) {
        self.sums = RowOffsets::from_heights(&self.heights, self.options.gap);
    }

    fn row(&self, index: usize) -> VirtualRow {
        let margin = self.options.scroll_margin as u64;
        VirtualRow {
            index,
            start: margin.saturating_add(self.start_of(index)),
            height: self.heights[index],
        }
    }

    fn start_of(&self, index: usize) -> u64 {
        self.options.padding_start as u64 + self.sums.prefix(index)
    }

    fn compute_visible_range(&self, scroll_offset: u64, viewport_size: u32) -> RowRange {
        let count = self.options.row_count;
        if count == 0 || viewport_size == 0 {
            return RowRange {
                start_row: 0,
                end_row: 0,
            };
        }

        let margin = self.options.scroll_margin as u64;
        let view = viewport_size as u64;

        let total = self.total_size();
        let max_scroll = margin.saturating_add(total.saturating_sub(view));
        let scroll_offset = scroll_offset.min(max_scroll);
        let scroll_end = scroll_offset.saturating_add(view);
        if scroll_end <= margin {
            // The viewport ends before the grid begins (header still on screen).
            return RowRange {
                start_row: 0,
                end_row: 0,
            };
        }

        let visible_start = scroll_offset.saturating_sub(margin);
        let visible_end_exclusive = scroll_end.saturating_sub(margin);

        if visible_start >= total {
            return RowRange {
                start_row: count,
                end_row: count,
            };
        }

        let visible_end_inclusive = visible_end_exclusive.saturating_sub(1);

        let start = self
            .row_at_offset_in_grid(visible_start)
            .unwrap_or(count)
            .min(count);
        let end = self
            .row_at_offset_in_grid(cmp::max(visible_end_inclusive, visible_start))
            .map(|i| i + 1)
            .unwrap_or(count)
            .min(count);

        RowRange {
            start_row: start,
            end_row: end,
        }
    }

    fn row_at_offset_in_grid(&self, offset: u64) -> Option<usize> {
        let ps = self.options.padding_start as u64;
        let count = self.options.row_count;
        if count == 0 {
            return None;
        }
        if offset < ps {
            return Some(0);
        }
        // `row_at` returns the number of rows whose prefix sum fits below the
        // target, which is exactly the covering row once clamped.
        let consumed = self.sums.row_at(offset - ps);
        Some(consumed.min(count.saturating_sub(1)))
    }
}
