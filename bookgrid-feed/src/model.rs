use serde::Deserialize;

/// Hard cap on items per page. The upstream API sometimes returns more than
/// requested; everything past this count is dropped so row partitioning stays
/// predictable.
pub const PAGE_SIZE: usize = 20;

/// Base URL for the cover image CDN.
pub const COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

/// One search result. Fields mirror the `fields` projection requested from the
/// search API; everything except `key` and `title` is optional on the wire.
///
/// Items are ordered by fetch arrival and never re-sorted here; any client-side
/// sort happens before the sequence reaches the grid.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Book {
    /// Stable identifier, e.g. `/works/OL45883W`.
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub author_name: Vec<String>,
    pub first_publish_year: Option<i32>,
    pub cover_i: Option<u64>,
    #[serde(default)]
    pub subject: Vec<String>,
}

/// One page of search results, immutable once fetched.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SearchPage {
    pub docs: Vec<Book>,
    #[serde(rename = "numFound")]
    pub num_found: u64,
    pub start: u64,
}

/// Cover image size variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverSize {
    Large,
    Medium,
    Small,
}

impl CoverSize {
    fn letter(self) -> char {
        match self {
            Self::Large => 'L',
            Self::Medium => 'M',
            Self::Small => 'S',
        }
    }
}

/// Derives the cover image URL for a cover id, or `None` when the book has no
/// cover (the renderer shows a placeholder).
pub fn cover_url(cover_id: Option<u64>, size: CoverSize) -> Option<String> {
    let id = cover_id?;
    Some(format!("{COVERS_BASE_URL}/b/id/{id}-{}.jpg", size.letter()))
}

impl Book {
    pub fn cover_url(&self, size: CoverSize) -> Option<String> {
        cover_url(self.cover_i, size)
    }
}
