//! Query sessions for the `bookgrid` crate.
//!
//! The core crate is pure math over row counts and heights; this crate adds
//! everything a book-browsing UI needs around it:
//!
//! - the Open Library wire model and cover URL derivation
//! - a sans-IO pagination cursor with stale-response protection
//! - an edge-triggered end-of-list prefetch sentinel
//! - a session controller wiring cursor, partition, virtualizer, and trigger
//! - a blocking HTTP search client
//!
//! Fetches are represented as tickets handed to the driver, so the session
//! never blocks: a pending fetch is just a state, and the UI stays responsive
//! while one is outstanding.
#![forbid(unsafe_code)]

mod client;
mod cursor;
mod error;
pub mod model;
mod prefetch;
mod session;

#[cfg(test)]
mod tests;

pub use client::{DEFAULT_BASE_URL, SearchClient};
pub use cursor::{CursorPhase, FetchTicket, PageCursor, ResolveOutcome};
pub use error::FetchError;
pub use model::{Book, CoverSize, PAGE_SIZE, SearchPage, cover_url};
pub use prefetch::{DEFAULT_LEAD_MARGIN, PrefetchTrigger};
pub use session::{GridSession, GridSessionOptions, PageFetcher};
