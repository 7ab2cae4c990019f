//! The seam between the roundup logic and a remote bookmarking service.

use std::future::Future;

use crate::error::Result;
use crate::types::{PostQuery, RawBookmark, UpsertRequest};

/// A remote store of bookmarks that can be queried by tag and written back.
///
/// Implementations own transport concerns (auth, timeouts); callers issue
/// one request at a time and never retry.
pub trait BookmarkSource {
    /// Fetch bookmarks matching `query`.
    fn fetch_by_tag(
        &self,
        query: &PostQuery,
    ) -> impl Future<Output = Result<Vec<RawBookmark>>> + Send;

    /// Create or overwrite a single bookmark.
    fn upsert(&self, request: &UpsertRequest) -> impl Future<Output = Result<()>> + Send;
}
