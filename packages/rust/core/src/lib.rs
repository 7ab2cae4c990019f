//! Roundup generation and bookmark bookkeeping.
//!
//! - [`roundup`] turns tagged bookmarks into an ordered list of markdown bullets.
//! - [`marker`] tags consumed bookmarks as processed so the next roundup skips them.

pub mod marker;
pub mod roundup;

#[cfg(test)]
pub(crate) mod testing;

pub use marker::{MarkProgress, MarkSummary, SilentProgress, mark_as_processed, processed_upsert};
pub use roundup::{ROUNDUP_FETCH_LIMIT, RoundupRequest, generate, render, render_line};
