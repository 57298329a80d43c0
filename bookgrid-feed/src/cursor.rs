use tracing::{debug, warn};

use crate::FetchError;
use crate::model::{Book, PAGE_SIZE, SearchPage};

/// Where the cursor is in its fetch lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorPhase {
    /// Blank query: the cursor never issues tickets.
    Disabled,
    /// Ready to issue the next fetch.
    Idle,
    /// One ticket is outstanding; `advance` is a no-op until it resolves.
    Fetching,
    /// Every available item has been loaded.
    Exhausted,
    /// The last fetch failed. Recoverable only via [`PageCursor::retry`].
    Errored,
}

impl Default for CursorPhase {
    fn default() -> Self {
        Self::Disabled
    }
}

/// Describes one fetch the driver must perform. Tagged with the cursor
/// generation so a response arriving after a query change is recognized as
/// stale and discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: String,
    page: u32,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// 1-based page number to request.
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// What [`PageCursor::resolve`] did with a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The page was appended (possibly truncated to [`PAGE_SIZE`]).
    Applied,
    /// The ticket belongs to a superseded query; nothing was mutated.
    Stale,
    /// The fetch failed; the cursor is now `Errored`.
    Failed,
}

/// Sans-IO pagination cursor for one query at a time.
///
/// The cursor owns fetch state but performs no IO: `advance` hands the caller
/// a [`FetchTicket`], the caller fetches however it likes (the bundled
/// [`crate::SearchClient`], a test script, an async runtime) and reports back
/// via `resolve`. At most one ticket is outstanding, so pages append strictly
/// in issue order and out-of-order arrival cannot occur.
///
/// Changing the query ([`PageCursor::start`]) bumps the generation: a ticket
/// issued before the change resolves to [`ResolveOutcome::Stale`] and leaves
/// the new session untouched. That generation check is the only cancellation
/// mechanism; in-flight transport is simply ignored on arrival.
#[derive(Debug, Default)]
pub struct PageCursor {
    query: String,
    generation: u64,
    phase: CursorPhase,
    pages_loaded: u32,
    total_available: Option<u64>,
    books: Vec<Book>,
    last_error: Option<FetchError>,
}

impl PageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new query session: discards all loaded pages, bumps the
    /// generation (orphaning any outstanding ticket), and resets fetch state.
    /// A blank query parks the cursor in [`CursorPhase::Disabled`].
    pub fn start(&mut self, query: &str) {
        let query = query.trim();
        self.generation = self.generation.wrapping_add(1);
        self.query = query.to_owned();
        self.pages_loaded = 0;
        self.total_available = None;
        self.books.clear();
        self.last_error = None;
        self.phase = if query.is_empty() {
            CursorPhase::Disabled
        } else {
            CursorPhase::Idle
        };
        debug!(
            target: "bookgrid_feed",
            query,
            generation = self.generation,
            "cursor start"
        );
    }

    /// Requests the next page. Returns a ticket only when the cursor is
    /// `Idle`; while `Fetching`, `Exhausted`, `Errored`, or `Disabled` this is
    /// an idempotent no-op, so rapid repeated prefetch signals cannot issue
    /// duplicate fetches.
    pub fn advance(&mut self) -> Option<FetchTicket> {
        if self.phase != CursorPhase::Idle {
            return None;
        }
        self.phase = CursorPhase::Fetching;
        let ticket = FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
            page: self.pages_loaded + 1,
        };
        debug!(
            target: "bookgrid_feed",
            page = ticket.page,
            generation = ticket.generation,
            "cursor advance"
        );
        Some(ticket)
    }

    /// Applies a fetch result for `ticket`.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        result: Result<SearchPage, FetchError>,
    ) -> ResolveOutcome {
        if ticket.generation != self.generation {
            debug!(
                target: "bookgrid_feed",
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding stale response"
            );
            return ResolveOutcome::Stale;
        }
        debug_assert_eq!(self.phase, CursorPhase::Fetching, "resolve without advance");

        match result {
            Ok(mut page) => {
                if page.docs.len() > PAGE_SIZE {
                    // Oversized page: keep the first PAGE_SIZE in response
                    // order, absorb the rest.
                    warn!(
                        target: "bookgrid_feed",
                        got = page.docs.len(),
                        "truncating oversized page"
                    );
                    page.docs.truncate(PAGE_SIZE);
                }
                let fetched = page.docs.len();
                self.books.append(&mut page.docs);
                self.pages_loaded += 1;
                self.total_available = Some(page.num_found);

                // An empty page means the server has nothing more for us even
                // if num_found claims otherwise; stop rather than spin.
                let exhausted = fetched == 0 || self.loaded_count() as u64 >= page.num_found;
                self.phase = if exhausted {
                    CursorPhase::Exhausted
                } else {
                    CursorPhase::Idle
                };
                debug!(
                    target: "bookgrid_feed",
                    fetched,
                    loaded = self.loaded_count(),
                    num_found = page.num_found,
                    exhausted,
                    "page applied"
                );
                ResolveOutcome::Applied
            }
            Err(err) => {
                warn!(target: "bookgrid_feed", error = %err, "fetch failed");
                self.last_error = Some(err);
                self.phase = CursorPhase::Errored;
                ResolveOutcome::Failed
            }
        }
    }

    /// Recovers from `Errored` back to `Idle`; the next [`Self::advance`]
    /// re-issues the failed page. No-op in any other phase (no auto-retry).
    pub fn retry(&mut self) {
        if self.phase == CursorPhase::Errored {
            self.phase = CursorPhase::Idle;
            self.last_error = None;
        }
    }

    pub fn phase(&self) -> CursorPhase {
        self.phase
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The flattened item list, in fetch order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn loaded_count(&self) -> usize {
        self.books.len()
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    /// Total result count reported by the server; `None` before the first
    /// page arrives.
    pub fn total_available(&self) -> Option<u64> {
        self.total_available
    }

    pub fn is_fetching(&self) -> bool {
        self.phase == CursorPhase::Fetching
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == CursorPhase::Exhausted
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }
}
