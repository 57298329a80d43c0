use bookgrid::{
    Breakpoints, Rect, RowPartition, RowVirtualizer, RowVirtualizerOptions, VirtualRow,
};
use tracing::debug;

use crate::cursor::{CursorPhase, FetchTicket, PageCursor, ResolveOutcome};
use crate::model::{Book, SearchPage};
use crate::prefetch::{DEFAULT_LEAD_MARGIN, PrefetchTrigger};
use crate::FetchError;

/// Something that can perform the fetch described by a [`FetchTicket`].
///
/// The bundled [`crate::SearchClient`] implements this over HTTP; tests use
/// scripted fakes. The session itself never blocks on IO: drivers either wire
/// a fetcher through [`GridSession::fetch_with`] or shuttle tickets and
/// results across whatever boundary suits their runtime.
pub trait PageFetcher {
    fn fetch_page(&mut self, ticket: &FetchTicket) -> Result<SearchPage, FetchError>;
}

/// Tuning knobs for a [`GridSession`].
#[derive(Clone, Debug)]
pub struct GridSessionOptions {
    pub breakpoints: Breakpoints,
    /// Starting guess for a row height until the row is measured.
    pub estimated_row_height: u32,
    /// Rows rendered beyond the viewport on each side.
    pub overscan: usize,
    /// How far before the sentinel reaches the viewport the next page loads.
    pub prefetch_margin: u64,
    /// Space between rows.
    pub gap: u32,
    /// Where the grid starts inside the scroll container (search header etc).
    pub scroll_margin: u32,
}

impl Default for GridSessionOptions {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            estimated_row_height: 520,
            overscan: 6,
            prefetch_margin: DEFAULT_LEAD_MARGIN,
            gap: 0,
            scroll_margin: 0,
        }
    }
}

/// One query session over the book grid: pagination cursor, row partition,
/// window virtualizer, and prefetch trigger wired together.
///
/// The session is externally driven, in the same spirit as the core
/// virtualizer: the UI layer reports viewport geometry, scroll offsets, and
/// row measurements; the session hands back fetch tickets and the set of rows
/// to render. Starting a new query fully replaces cursor and virtualizer
/// state; nothing is shared across sessions.
#[derive(Debug)]
pub struct GridSession {
    options: GridSessionOptions,
    cursor: PageCursor,
    partition: RowPartition,
    virtualizer: RowVirtualizer,
    trigger: PrefetchTrigger,
    viewport_width: u32,
}

impl GridSession {
    pub fn new(options: GridSessionOptions) -> Self {
        let virtualizer = Self::build_virtualizer(&options, 0);
        Self {
            cursor: PageCursor::new(),
            partition: RowPartition::new(0, 1),
            trigger: PrefetchTrigger::new(options.prefetch_margin),
            viewport_width: 0,
            options,
            virtualizer,
        }
    }

    fn build_virtualizer(options: &GridSessionOptions, row_count: usize) -> RowVirtualizer {
        let estimate = options.estimated_row_height;
        RowVirtualizer::new(
            RowVirtualizerOptions::new(row_count, estimate)
                .with_overscan(options.overscan)
                .with_gap(options.gap)
                .with_scroll_margin(options.scroll_margin),
        )
    }

    /// Starts a new query session, immediately requesting the first page
    /// (`None` for a blank query).
    ///
    /// The previous session's loaded set, measurements, and scroll position
    /// are discarded; a ticket still in flight from the old session will
    /// resolve as stale.
    pub fn start(&mut self, query: &str) -> Option<FetchTicket> {
        debug!(target: "bookgrid_feed", query, "session start");
        self.cursor.start(query);
        self.partition = RowPartition::new(0, self.columns_for_current_width());
        let rect = self.virtualizer.scroll_rect();
        self.virtualizer = Self::build_virtualizer(&self.options, 0);
        self.virtualizer.set_scroll_rect(rect);
        self.trigger.reset();
        self.cursor.advance()
    }

    fn columns_for_current_width(&self) -> usize {
        self.options.breakpoints.columns_for(self.viewport_width)
    }

    /// Reports viewport geometry (a resize or the initial layout).
    ///
    /// The breakpoint table is evaluated on every call, but the partition and
    /// measurements are only touched when the column count actually changed;
    /// same-bucket resizes just update the scroll rect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.virtualizer.set_scroll_rect(Rect {
            main: height,
            cross: width,
        });

        let columns = self.columns_for_current_width();
        let change = self
            .partition
            .update(self.cursor.loaded_count(), columns);
        if change.columns_changed {
            debug!(target: "bookgrid_feed", columns, "columns changed, repartitioning");
            // Row boundaries moved: every cached measurement is invalid.
            self.virtualizer.set_row_count(self.partition.row_count());
            self.virtualizer.reset_measurements();
        } else if change.items_changed {
            self.virtualizer.set_row_count(self.partition.row_count());
        }
    }

    /// Reports a scroll event from the UI layer.
    pub fn on_scroll(&mut self, scroll_offset: u64, now_ms: u64) {
        self.virtualizer
            .apply_scroll_offset_event_clamped(scroll_offset, now_ms);
    }

    /// Measurement port: the rendering boundary reports a row's real height
    /// once it has been laid out.
    pub fn on_row_rendered(&mut self, row_index: usize, measured_height: u32) {
        self.virtualizer.measure(row_index, measured_height);
    }

    /// Advances the session one frame: runs scroll debouncing and checks the
    /// end-of-list sentinel. Returns a ticket when the next page should be
    /// fetched.
    pub fn tick(&mut self, now_ms: u64) -> Option<FetchTicket> {
        self.virtualizer.update_scrolling(now_ms);

        // The sentinel sits directly after the last row.
        let sentinel_start =
            (self.options.scroll_margin as u64).saturating_add(self.virtualizer.total_size());
        let blocked = self.cursor.phase() != CursorPhase::Idle;
        let fire = self.trigger.observe(
            sentinel_start,
            self.virtualizer.scroll_offset(),
            self.virtualizer.viewport_size(),
            blocked,
        );
        if !fire {
            return None;
        }
        self.cursor.advance()
    }

    /// Applies a fetch result. On success the new page's items extend the
    /// partition and the virtualizer's row count; only the previously-last
    /// row's measurement is invalidated (it may have gained items), everything
    /// before it keeps its measured height and offset.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        result: Result<SearchPage, FetchError>,
    ) -> ResolveOutcome {
        // A partial last row will absorb items from the incoming page.
        let stale_last_row = self
            .partition
            .last_row()
            .filter(|&r| self.partition.row_len(r) < self.partition.columns());

        let outcome = self.cursor.resolve(ticket, result);
        match outcome {
            ResolveOutcome::Applied => {
                let change = self
                    .partition
                    .update(self.cursor.loaded_count(), self.partition.columns());
                if change.items_changed {
                    self.virtualizer.set_row_count(self.partition.row_count());
                    if let Some(row) = stale_last_row {
                        self.virtualizer.reset_measurement(row);
                    }
                }
                self.trigger.settled();
            }
            ResolveOutcome::Failed => self.trigger.settled(),
            ResolveOutcome::Stale => {}
        }
        outcome
    }

    /// Polls for a ticket (via [`Self::tick`]) and, if one is due, runs it
    /// through `fetcher` and applies the result. Convenience for blocking
    /// drivers; returns the outcome when a fetch happened.
    pub fn pump(
        &mut self,
        fetcher: &mut impl PageFetcher,
        now_ms: u64,
    ) -> Option<ResolveOutcome> {
        let ticket = self.tick(now_ms)?;
        Some(self.fetch_with(fetcher, ticket))
    }

    /// Runs one ticket through `fetcher` and applies the result.
    pub fn fetch_with(
        &mut self,
        fetcher: &mut impl PageFetcher,
        ticket: FetchTicket,
    ) -> ResolveOutcome {
        let result = fetcher.fetch_page(&ticket);
        self.resolve(ticket, result)
    }

    /// Recovers from a failed fetch and immediately re-requests the page.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        self.cursor.retry();
        self.cursor.advance()
    }

    /// Iterates the rows to render: geometry plus the books each row holds.
    pub fn for_each_visible_row(&self, mut f: impl FnMut(VirtualRow, &[Book])) {
        let books = self.cursor.books();
        self.virtualizer.for_each_virtual_row(|row| {
            if let Some(range) = self.partition.row(row.index) {
                f(row, &books[range]);
            }
        });
    }

    pub fn books(&self) -> &[Book] {
        self.cursor.books()
    }

    pub fn columns(&self) -> usize {
        self.partition.columns()
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn partition(&self) -> &RowPartition {
        &self.partition
    }

    pub fn virtualizer(&self) -> &RowVirtualizer {
        &self.virtualizer
    }

    pub fn virtualizer_mut(&mut self) -> &mut RowVirtualizer {
        &mut self.virtualizer
    }
}
