use tracing::debug;

use crate::FetchError;
use crate::cursor::FetchTicket;
use crate::model::SearchPage;
use crate::session::PageFetcher;

/// Default base URL of the search API.
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Projection requested from the search API. Keeping the field list fixed
/// keeps responses small and the `Book` model stable.
const FIELDS: &str = "key,title,author_name,first_publish_year,cover_i,subject";

/// Blocking Open Library search client.
#[derive(Clone, Debug)]
pub struct SearchClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl SearchClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the client at a different server (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Fetches one page of results. `page` is 1-based.
    ///
    /// The page is returned as-is; the cursor enforces the page-size cap.
    pub fn search(&self, query: &str, page: u32) -> Result<SearchPage, FetchError> {
        let url = format!("{}/search.json", self.base_url);
        debug!(target: "bookgrid_feed", query, page, "search request");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.trim()), ("fields", FIELDS)])
            .query(&[("page", page)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let page: SearchPage = serde_json::from_str(&body)?;
        debug!(
            target: "bookgrid_feed",
            docs = page.docs.len(),
            num_found = page.num_found,
            "search response"
        );
        Ok(page)
    }
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFetcher for SearchClient {
    fn fetch_page(&mut self, ticket: &FetchTicket) -> Result<SearchPage, FetchError> {
        self.search(ticket.query(), ticket.page())
    }
}
