use alloc::sync::Arc;

use crate::Rect;
use crate::virtualizer::RowVirtualizer;

/// A callback fired when the virtualizer's state changes.
///
/// The second argument is `is_scrolling`.
pub type OnChangeCallback = Arc<dyn Fn(&RowVirtualizer, bool) + Send + Sync>;

/// Initial scroll offset configuration.
#[derive(Clone)]
pub enum InitialOffset {
    /// A fixed initial offset.
    Value(u64),
    /// A lazily evaluated provider (called by `RowVirtualizer::new`).
    Provider(Arc<dyn Fn() -> u64 + Send + Sync>),
}

impl InitialOffset {
    pub(crate) fn resolve(&self) -> u64 {
        match self {
            Self::Value(v) => *v,
            Self::Provider(f) => f(),
        }
    }
}

impl Default for InitialOffset {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl core::fmt::Debug for InitialOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Configuration for [`crate::RowVirtualizer`].
///
/// Cheap to clone: the estimate closure is stored in an `Arc`.
pub struct RowVirtualizerOptions {
    /// Number of rows in the partition.
    pub row_count: usize,
    /// Estimated height for a row that has not been measured yet.
    ///
    /// For a book grid a single constant works well (card height is roughly
    /// uniform); the closure form lets adapters vary it per row index.
    pub estimate_height: Arc<dyn Fn(usize) -> u32 + Send + Sync>,

    /// Enables/disables the virtualizer. When disabled, query methods return
    /// empty results.
    pub enabled: bool,

    /// Extra rows rendered on each side of the strict viewport range to mask
    /// scroll-induced pop-in.
    pub overscan: usize,

    /// The initial viewport geometry, if known at construction time.
    pub initial_rect: Option<Rect>,

    /// Padding before the first row.
    pub padding_start: u32,
    /// Padding after the last row.
    pub padding_end: u32,

    /// Additional padding applied when computing scroll-to offsets.
    pub scroll_padding_start: u32,
    /// Additional padding applied when computing scroll-to offsets.
    pub scroll_padding_end: u32,

    /// Where the grid starts inside the scroll container. Useful for window
    /// scrolling where the grid begins below a search header.
    pub scroll_margin: u32,

    /// Initial scroll offset.
    pub initial_offset: InitialOffset,

    /// Optional callback fired when the virtualizer's state changes.
    pub on_change: Option<OnChangeCallback>,

    /// Debounce duration for resetting `is_scrolling` after the last scroll
    /// event (driven by adapter-provided timestamps).
    pub is_scrolling_reset_delay_ms: u64,

    /// Space between rows.
    pub gap: u32,
}

impl Clone for RowVirtualizerOptions {
    fn clone(&self) -> Self {
        Self {
            row_count: self.row_count,
            estimate_height: Arc::clone(&self.estimate_height),
            enabled: self.enabled,
            overscan: self.overscan,
            initial_rect: self.initial_rect,
            padding_start: self.padding_start,
            padding_end: self.padding_end,
            scroll_padding_start: self.scroll_padding_start,
            scroll_padding_end: self.scroll_padding_end,
            scroll_margin: self.scroll_margin,
            initial_offset: self.initial_offset.clone(),
            on_change: self.on_change.clone(),
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            gap: self.gap,
        }
    }
}

impl RowVirtualizerOptions {
    /// Creates options with a constant estimated row height.
    pub fn new(row_count: usize, estimated_row_height: u32) -> Self {
        Self::new_with_estimate(row_count, move |_| estimated_row_height)
    }

    /// Creates options with a per-row height estimate.
    pub fn new_with_estimate(
        row_count: usize,
        estimate_height: impl Fn(usize) -> u32 + Send + Sync + 'static,
    ) -> Self {
        Self {
            row_count,
            estimate_height: Arc::new(estimate_height),
            enabled: true,
            overscan: 1,
            initial_rect: None,
            padding_start: 0,
            padding_end: 0,
            scroll_padding_start: 0,
            scroll_padding_end: 0,
            scroll_margin: 0,
            initial_offset: InitialOffset::default(),
            on_change: None,
            is_scrolling_reset_delay_ms: 150,
            gap: 0,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_initial_rect(mut self, initial_rect: Option<Rect>) -> Self {
        self.initial_rect = initial_rect;
        self
    }

    pub fn with_padding(mut self, padding_start: u32, padding_end: u32) -> Self {
        self.padding_start = padding_start;
        self.padding_end = padding_end;
        self
    }

    pub fn with_scroll_padding(
        mut self,
        scroll_padding_start: u32,
        scroll_padding_end: u32,
    ) -> Self {
        self.scroll_padding_start = scroll_padding_start;
        self.scroll_padding_end = scroll_padding_end;
        self
    }

    pub fn with_scroll_margin(mut self, scroll_margin: u32) -> Self {
        self.scroll_margin = scroll_margin;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: InitialOffset) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_initial_offset_value(mut self, initial_offset: u64) -> Self {
        self.initial_offset = InitialOffset::Value(initial_offset);
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&RowVirtualizer, bool) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }
}

impl core::fmt::Debug for RowVirtualizerOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RowVirtualizerOptions")
            .field("row_count", &self.row_count)
            .field("enabled", &self.enabled)
            .field("overscan", &self.overscan)
            .field("initial_rect", &self.initial_rect)
            .field("padding_start", &self.padding_start)
            .field("padding_end", &self.padding_end)
            .field("scroll_padding_start", &self.scroll_padding_start)
            .field("scroll_padding_end", &self.scroll_padding_end)
            .field("scroll_margin", &self.scroll_margin)
            .field("initial_offset", &self.initial_offset)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .field("gap", &self.gap)
            .finish_non_exhaustive()
    }
}
