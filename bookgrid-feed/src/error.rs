use thiserror::Error;

/// A failed page fetch. This is the only error surfaced to callers; stale
/// responses and oversized pages are absorbed by the cursor.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search returned status {0}")]
    Status(u16),
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}
