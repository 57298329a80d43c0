// Example: drive a grid session offline with a scripted fetcher.
use bookgrid_feed::{
    Book, FetchError, FetchTicket, GridSession, GridSessionOptions, PAGE_SIZE, PageFetcher,
    SearchPage,
};

/// Serves synthetic pages for a catalogue of `total` books.
struct FakeCatalogue {
    total: usize,
}

impl PageFetcher for FakeCatalogue {
    fn fetch_page(&mut self, ticket: &FetchTicket) -> Result<SearchPage, FetchError> {
        let start = (ticket.page() as usize - 1) * PAGE_SIZE;
        let count = self.total.saturating_sub(start).min(PAGE_SIZE);
        let docs = (start..start + count)
            .map(|i| Book {
                key: format!("/works/OL{i}W"),
                title: format!("{} vol. {}", ticket.query(), i + 1),
                author_name: vec!["A. Writer".to_owned()],
                first_publish_year: Some(1950 + i as i32),
                cover_i: Some(1000 + i as u64),
                subject: vec![],
            })
            .collect();
        Ok(SearchPage {
            docs,
            num_found: self.total as u64,
            start: start as u64,
        })
    }
}

fn main() {
    let mut fetcher = FakeCatalogue { total: 45 };
    let mut session = GridSession::new(GridSessionOptions::default());
    session.set_viewport(1280, 800);

    let ticket = session.start("fake catalogue").expect("non-blank query");
    session.fetch_with(&mut fetcher, ticket);
    println!(
        "first page: {} books in {} columns, {} rows",
        session.books().len(),
        session.columns(),
        session.partition().row_count()
    );

    // Rows report their real heights once rendered; row 0 turns out taller.
    session.on_row_rendered(0, 560);
    println!("after measuring row 0: total_height={}", session.virtualizer().total_size());

    // Keep scrolling down; the sentinel drains the catalogue, then goes quiet.
    let mut now_ms = 0;
    while !session.cursor().is_exhausted() {
        session.on_scroll(session.virtualizer().max_scroll_offset(), now_ms);
        if session.pump(&mut fetcher, now_ms).is_none() {
            break;
        }
        now_ms += 16;
    }
    println!(
        "exhausted: {} of {:?} books, {} rows, last row has {} items",
        session.books().len(),
        session.cursor().total_available(),
        session.partition().row_count(),
        session.partition().row_len(session.partition().last_row().unwrap_or(0))
    );
}
