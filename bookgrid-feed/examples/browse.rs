// Example: browse live Open Library search results through a virtualized grid.
//
// Usage: cargo run --example browse -- "dune"
use std::env;

use bookgrid_feed::{CoverSize, GridSession, GridSessionOptions, SearchClient};

fn main() {
    let query = env::args().nth(1).unwrap_or_else(|| "dune".to_owned());

    let mut client = SearchClient::new();
    let mut session = GridSession::new(GridSessionOptions::default());
    session.set_viewport(1280, 800);

    let Some(ticket) = session.start(&query) else {
        eprintln!("blank query, nothing to do");
        return;
    };
    session.fetch_with(&mut client, ticket);
    if let Some(err) = session.cursor().last_error() {
        eprintln!("initial fetch failed: {err}");
        return;
    }

    println!(
        "query={:?} loaded={} of {:?} columns={}",
        query,
        session.books().len(),
        session.cursor().total_available(),
        session.columns()
    );

    // Scroll to the bottom a few times; the sentinel pulls in more pages.
    let mut now_ms = 0;
    for _ in 0..3 {
        session.on_scroll(session.virtualizer().max_scroll_offset(), now_ms);
        session.pump(&mut client, now_ms);
        now_ms += 16;
    }
    println!(
        "after scrolling: loaded={} rows={} total_height={}",
        session.books().len(),
        session.partition().row_count(),
        session.virtualizer().total_size()
    );

    // Render the rows around the current offset.
    session.for_each_visible_row(|row, books| {
        println!("row {} @{}..{} ({}px)", row.index, row.start, row.end(), row.height);
        for book in books {
            let cover = book
                .cover_url(CoverSize::Medium)
                .unwrap_or_else(|| "(no cover)".to_owned());
            println!(
                "  {} ({}) {}",
                book.title,
                book.first_publish_year.map_or("?".to_owned(), |y| y.to_string()),
                cover
            );
        }
    });
}
