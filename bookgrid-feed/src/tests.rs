use std::collections::VecDeque;

use crate::*;

fn make_books(start: usize, count: usize) -> Vec<Book> {
    (start..start + count)
        .map(|i| Book {
            key: format!("/works/OL{i}W"),
            title: format!("Book {i}"),
            author_name: vec![format!("Author {i}")],
            first_publish_year: Some(1990 + (i % 30) as i32),
            cover_i: (i % 3 != 0).then(|| 10_000 + i as u64),
            subject: Vec::new(),
        })
        .collect()
}

fn page(start: usize, count: usize, num_found: u64) -> SearchPage {
    SearchPage {
        docs: make_books(start, count),
        num_found,
        start: start as u64,
    }
}

/// A fetcher that replays a script of canned results.
struct ScriptedFetcher {
    script: VecDeque<Result<SearchPage, FetchError>>,
    calls: usize,
}

impl ScriptedFetcher {
    fn new(script: impl IntoIterator<Item = Result<SearchPage, FetchError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            calls: 0,
        }
    }
}

impl PageFetcher for ScriptedFetcher {
    fn fetch_page(&mut self, _ticket: &FetchTicket) -> Result<SearchPage, FetchError> {
        self.calls += 1;
        self.script
            .pop_front()
            .unwrap_or(Err(FetchError::Status(503)))
    }
}

// --- model --------------------------------------------------------------------

#[test]
fn cover_url_derivation() {
    assert_eq!(
        cover_url(Some(240727), CoverSize::Large).as_deref(),
        Some("https://covers.openlibrary.org/b/id/240727-L.jpg")
    );
    assert_eq!(
        cover_url(Some(7), CoverSize::Small).as_deref(),
        Some("https://covers.openlibrary.org/b/id/7-S.jpg")
    );
    assert_eq!(cover_url(None, CoverSize::Medium), None);
}

#[test]
fn search_page_deserializes_from_the_wire_shape() {
    let json = r#"{
        "numFound": 45,
        "start": 0,
        "docs": [
            {"key": "/works/OL45883W", "title": "Dune", "author_name": ["Frank Herbert"],
             "first_publish_year": 1965, "cover_i": 240727, "subject": ["Science fiction"]},
            {"key": "/works/OL893415W", "title": "Untitled"}
        ]
    }"#;
    let page: SearchPage = serde_json::from_str(json).unwrap();
    assert_eq!(page.num_found, 45);
    assert_eq!(page.docs.len(), 2);
    assert_eq!(page.docs[0].author_name, vec!["Frank Herbert"]);
    assert_eq!(page.docs[1].author_name, Vec::<String>::new());
    assert_eq!(page.docs[1].cover_i, None);
}

// --- cursor -------------------------------------------------------------------

#[test]
fn forty_five_results_load_in_three_pages_then_exhaust() {
    let mut c = PageCursor::new();
    c.start("science");

    for (i, count) in [20usize, 20, 5].iter().enumerate() {
        let ticket = c.advance().expect("should issue a ticket");
        assert_eq!(ticket.page(), i as u32 + 1);
        let loaded_before = c.loaded_count();
        let outcome = c.resolve(ticket, Ok(page(loaded_before, *count, 45)));
        assert_eq!(outcome, ResolveOutcome::Applied);
        assert!(c.loaded_count() >= loaded_before);
        assert!(c.loaded_count() as u64 <= c.total_available().unwrap());
    }

    assert_eq!(c.loaded_count(), 45);
    assert_eq!(c.phase(), CursorPhase::Exhausted);
    assert_eq!(c.pages_loaded(), 3);

    // A 4th advance is a no-op.
    assert_eq!(c.advance(), None);
}

#[test]
fn advance_is_idempotent_while_fetching() {
    let mut c = PageCursor::new();
    c.start("rust");
    let first = c.advance();
    assert!(first.is_some());
    // Rapid repeated prefetch signals without a resolution: one fetch only.
    assert_eq!(c.advance(), None);
    assert_eq!(c.advance(), None);
    assert!(c.is_fetching());
}

#[test]
fn stale_response_after_query_change_is_discarded() {
    let mut c = PageCursor::new();
    c.start("query a");
    let ticket_a = c.advance().unwrap();

    // Query changes while A's fetch is in flight.
    c.start("query b");
    let outcome = c.resolve(ticket_a, Ok(page(0, 20, 100)));
    assert_eq!(outcome, ResolveOutcome::Stale);

    // B's session is untouched: nothing loaded, ready to fetch.
    assert_eq!(c.loaded_count(), 0);
    assert_eq!(c.phase(), CursorPhase::Idle);
    assert_eq!(c.total_available(), None);

    let ticket_b = c.advance().unwrap();
    assert_eq!(ticket_b.query(), "query b");
    assert_eq!(ticket_b.page(), 1);
}

#[test]
fn oversized_pages_are_truncated_deterministically() {
    let mut c = PageCursor::new();
    c.start("popular");
    let ticket = c.advance().unwrap();
    // Server ignores the page size and returns 27 docs.
    c.resolve(ticket, Ok(page(0, 27, 1000)));

    assert_eq!(c.loaded_count(), PAGE_SIZE);
    // The first PAGE_SIZE docs in response order survive.
    assert_eq!(c.books()[0].key, "/works/OL0W");
    assert_eq!(c.books()[PAGE_SIZE - 1].key, format!("/works/OL{}W", PAGE_SIZE - 1));
}

#[test]
fn fetch_failure_is_terminal_until_retry() {
    let mut c = PageCursor::new();
    c.start("flaky");
    let ticket = c.advance().unwrap();
    let outcome = c.resolve(ticket, Err(FetchError::Status(500)));
    assert_eq!(outcome, ResolveOutcome::Failed);
    assert_eq!(c.phase(), CursorPhase::Errored);
    assert!(c.last_error().is_some());

    // No automatic retry.
    assert_eq!(c.advance(), None);

    c.retry();
    assert_eq!(c.phase(), CursorPhase::Idle);
    let ticket = c.advance().unwrap();
    assert_eq!(ticket.page(), 1); // the failed page is re-requested
    c.resolve(ticket, Ok(page(0, 20, 45)));
    assert_eq!(c.loaded_count(), 20);
}

#[test]
fn blank_query_never_fetches() {
    let mut c = PageCursor::new();
    c.start("   ");
    assert_eq!(c.phase(), CursorPhase::Disabled);
    assert_eq!(c.advance(), None);
}

#[test]
fn empty_page_exhausts_even_if_num_found_disagrees() {
    let mut c = PageCursor::new();
    c.start("ghost");
    let ticket = c.advance().unwrap();
    c.resolve(ticket, Ok(page(0, 0, 99)));
    assert_eq!(c.phase(), CursorPhase::Exhausted);
    assert_eq!(c.advance(), None);
}

#[test]
fn loaded_count_is_monotonic_across_many_advances() {
    let mut c = PageCursor::new();
    c.start("long tail");
    let mut prev = 0;
    while let Some(ticket) = c.advance() {
        let remaining = 105 - c.loaded_count();
        c.resolve(ticket, Ok(page(c.loaded_count(), remaining.min(20), 105)));
        assert!(c.loaded_count() >= prev);
        assert!(c.loaded_count() as u64 <= c.total_available().unwrap());
        prev = c.loaded_count();
    }
    assert_eq!(c.loaded_count(), 105);
    assert_eq!(c.pages_loaded(), 6);
}

// --- prefetch trigger ---------------------------------------------------------

#[test]
fn trigger_fires_once_per_crossing() {
    let mut t = PrefetchTrigger::new(600);

    // Sentinel far away: nothing.
    assert!(!t.observe(10_000, 0, 800, false));
    // Scrolled close enough (10_000 <= 9_000 + 600 is false, 9_500 + 600 fires).
    assert!(!t.observe(10_000, 8_200, 800, false));
    assert!(t.observe(10_000, 8_700, 800, false));
    // Still in range: no duplicate.
    assert!(!t.observe(10_000, 8_800, 800, false));
    assert!(!t.observe(10_000, 9_000, 800, false));

    // Leaves range, comes back: fires again.
    assert!(!t.observe(10_000, 1_000, 800, false));
    assert!(t.observe(10_000, 8_700, 800, false));
}

#[test]
fn trigger_is_suppressed_while_blocked() {
    let mut t = PrefetchTrigger::new(0);
    // Blocked (fetch in flight): no fire, but the crossing is not consumed.
    assert!(!t.observe(100, 50, 100, true));
    assert!(!t.observe(100, 60, 100, true));
    // Unblocked while still in range: fires.
    assert!(t.observe(100, 60, 100, false));
}

#[test]
fn trigger_rearms_when_a_fetch_settles_in_range() {
    let mut t = PrefetchTrigger::new(600);
    assert!(t.observe(1_000, 500, 800, false));
    // Fetch in flight, sentinel still in range.
    assert!(!t.observe(1_000, 500, 800, true));
    t.settled();
    // New rows pushed the sentinel out: no fire, trigger rearms.
    assert!(!t.observe(50_000, 500, 800, false));
    // ...but a short page that leaves it in range keeps loading.
    let mut t = PrefetchTrigger::new(600);
    assert!(t.observe(1_000, 500, 800, false));
    t.settled();
    assert!(t.observe(1_200, 500, 800, false));
}

// --- session ------------------------------------------------------------------

fn science_session() -> (GridSession, Option<FetchTicket>) {
    let mut s = GridSession::new(GridSessionOptions {
        estimated_row_height: 520,
        overscan: 6,
        prefetch_margin: 600,
        ..GridSessionOptions::default()
    });
    s.set_viewport(1300, 800);
    let ticket = s.start("science");
    (s, ticket)
}

#[test]
fn session_starts_with_an_initial_fetch_and_five_columns() {
    let (s, ticket) = science_session();
    assert_eq!(s.columns(), 5);
    let ticket = ticket.expect("non-blank query fetches eagerly");
    assert_eq!(ticket.query(), "science");
    assert_eq!(ticket.page(), 1);
    assert!(s.cursor().is_fetching());
}

#[test]
fn session_partitions_loaded_books_into_rows() {
    let (mut s, ticket) = science_session();
    s.resolve(ticket.unwrap(), Ok(page(0, 20, 47)));

    // 20 books x 5 columns -> 4 rows.
    assert_eq!(s.partition().row_count(), 4);
    assert_eq!(s.virtualizer().row_count(), 4);

    // Grid rows expose their book slices.
    let mut seen = Vec::new();
    s.for_each_visible_row(|row, books| {
        seen.push((row.index, books.len()));
    });
    assert_eq!(seen, vec![(0, 5), (1, 5), (2, 5), (3, 5)]);
}

#[test]
fn session_loads_45_results_to_exhaustion_via_pump() {
    let (mut s, ticket) = science_session();
    let mut fetcher = ScriptedFetcher::new([
        Ok(page(20, 20, 45)),
        Ok(page(40, 5, 45)),
    ]);
    s.resolve(ticket.unwrap(), Ok(page(0, 20, 45)));

    // Keep the viewport pinned to the bottom so the sentinel stays within the
    // lead margin until pages run out.
    let mut ticks = 0;
    while s.cursor().phase() != CursorPhase::Exhausted && ticks < 10 {
        let now = ticks as u64 * 16;
        s.on_scroll(s.virtualizer().max_scroll_offset(), now);
        s.pump(&mut fetcher, now);
        ticks += 1;
    }

    assert_eq!(s.books().len(), 45);
    assert_eq!(s.cursor().phase(), CursorPhase::Exhausted);
    assert_eq!(fetcher.calls, 2);
    // 45 books x 5 columns -> 9 full rows.
    assert_eq!(s.partition().row_count(), 9);

    // Further ticks never issue tickets.
    assert_eq!(s.tick(1_000), None);
}

#[test]
fn appending_a_page_keeps_full_row_measurements_and_resets_the_partial_one() {
    let (mut s, ticket) = science_session();
    // First page: 17 books -> 3 full rows + 1 partial (2 items).
    s.resolve(ticket.unwrap(), Ok(page(0, 17, 37)));
    assert_eq!(s.partition().row_count(), 4);
    assert_eq!(s.partition().row_len(3), 2);

    s.on_row_rendered(0, 540);
    s.on_row_rendered(3, 300); // short partial row
    assert!(s.virtualizer().is_measured(0));
    assert!(s.virtualizer().is_measured(3));

    // Second page arrives: row 3 fills up to 5 items, rows 4..8 appear.
    s.on_scroll(s.virtualizer().max_scroll_offset(), 0);
    let ticket = s.tick(0).expect("sentinel in range issues a ticket");
    s.resolve(ticket, Ok(page(17, 20, 37)));

    assert_eq!(s.books().len(), 37);
    assert_eq!(s.partition().row_count(), 8);
    assert!(s.virtualizer().is_measured(0), "full row keeps its measurement");
    assert!(
        !s.virtualizer().is_measured(3),
        "partial row gained items, measurement is stale"
    );
    assert_eq!(s.virtualizer().row_height(3), Some(520)); // back to estimate
}

#[test]
fn column_change_invalidates_all_measurements() {
    let (mut s, ticket) = science_session();
    s.resolve(ticket.unwrap(), Ok(page(0, 20, 20)));
    s.on_row_rendered(0, 600);
    s.on_row_rendered(1, 610);

    // Same bucket: nothing invalidated.
    s.set_viewport(1290, 800);
    assert!(s.virtualizer().is_measured(0));

    // 1300 -> 1100 crosses into the 4-column bucket: 20 books -> 5 rows.
    s.set_viewport(1100, 800);
    assert_eq!(s.columns(), 4);
    assert_eq!(s.partition().row_count(), 5);
    assert_eq!(s.virtualizer().row_count(), 5);
    assert!(!s.virtualizer().is_measured(0));
    assert!(!s.virtualizer().is_measured(1));
}

#[test]
fn changing_the_query_mid_flight_discards_the_old_response() {
    let (mut s, ticket_a) = science_session();
    let ticket_a = ticket_a.unwrap();

    // New query before A resolves.
    let ticket_b = s.start("history").unwrap();
    assert_eq!(ticket_b.query(), "history");

    // A's response arrives late.
    assert_eq!(
        s.resolve(ticket_a, Ok(page(0, 20, 100))),
        ResolveOutcome::Stale
    );
    assert!(s.books().is_empty());
    assert_eq!(s.partition().row_count(), 0);

    // B proceeds normally.
    s.resolve(ticket_b, Ok(page(0, 20, 30)));
    assert_eq!(s.books().len(), 20);
}

#[test]
fn failed_fetch_surfaces_and_session_retry_reissues() {
    let (mut s, ticket) = science_session();
    assert_eq!(
        s.resolve(ticket.unwrap(), Err(FetchError::Status(502))),
        ResolveOutcome::Failed
    );
    assert_eq!(s.cursor().phase(), CursorPhase::Errored);
    // No ticket without an explicit retry.
    assert_eq!(s.tick(0), None);

    let ticket = s.retry().expect("retry re-issues the failed page");
    assert_eq!(ticket.page(), 1);
    s.resolve(ticket, Ok(page(0, 20, 45)));
    assert_eq!(s.books().len(), 20);
}

#[test]
fn scroll_and_measurement_flow_through_the_session() {
    let (mut s, ticket) = science_session();
    s.resolve(ticket.unwrap(), Ok(page(0, 20, 1000)));
    // Grow the grid well past one viewport of rows.
    for _ in 0..4 {
        s.on_scroll(s.virtualizer().max_scroll_offset(), 0);
        let t = s.tick(0).expect("pinned to the bottom, sentinel in range");
        let start = s.books().len();
        s.resolve(t, Ok(page(start, 20, 1000)));
    }
    assert_eq!(s.books().len(), 100);

    let total_before = s.virtualizer().total_size();
    s.on_scroll(1_200, 100);
    assert_eq!(s.virtualizer().scroll_offset(), 1_200);

    // Measuring a row above the viewport compensates the offset.
    s.on_row_rendered(0, 560);
    assert_eq!(s.virtualizer().scroll_offset(), 1_240);
    assert_eq!(s.virtualizer().total_size(), total_before + 40);
}
