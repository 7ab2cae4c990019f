//! Mark bookmarks as processed so later roundups skip them.

use tracing::{info, instrument};

use roundup_shared::{
    Bookmark, BookmarkSource, PROCESSED_TAG, PostQuery, RawBookmark, Result, UpsertRequest,
};

/// Outcome of a mark-as-processed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkSummary {
    /// Bookmarks that received the processed tag.
    pub marked: usize,
    /// Bookmarks that already carried it.
    pub skipped: usize,
}

/// Progress callback for the marking pass.
pub trait MarkProgress: Send + Sync {
    /// Called once the bookmarks needing a tag are known.
    fn started(&self, pending: usize);
    /// Called after each successful upsert.
    fn marked(&self, href: &str, current: usize, total: usize);
    /// Called when the pass completes.
    fn done(&self, summary: &MarkSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl MarkProgress for SilentProgress {
    fn started(&self, _pending: usize) {}
    fn marked(&self, _href: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &MarkSummary) {}
}

/// Add [`PROCESSED_TAG`] to every bookmark tagged `configured_tag` that lacks it.
///
/// Upserts are issued one at a time and the first failure is returned as is;
/// bookmarks written before it keep their new tag, and a rerun picks up
/// where this one stopped.
#[instrument(skip_all, fields(tag = %configured_tag))]
pub async fn mark_as_processed<S: BookmarkSource>(
    source: &S,
    configured_tag: &str,
    progress: &dyn MarkProgress,
) -> Result<MarkSummary> {
    let fetched = source.fetch_by_tag(&PostQuery::tagged(configured_tag)).await?;

    let (already, pending): (Vec<RawBookmark>, Vec<RawBookmark>) =
        fetched.into_iter().partition(RawBookmark::is_processed);

    let pending = pending
        .into_iter()
        .map(RawBookmark::validate)
        .collect::<Result<Vec<_>>>()?;

    let total = pending.len();
    progress.started(total);

    for (i, bookmark) in pending.into_iter().enumerate() {
        let request = processed_upsert(bookmark);
        source.upsert(&request).await?;
        progress.marked(&request.href, i + 1, total);
    }

    let summary = MarkSummary {
        marked: total,
        skipped: already.len(),
    };
    progress.done(&summary);

    info!(
        marked = summary.marked,
        skipped = summary.skipped,
        "marked bookmarks as processed"
    );

    Ok(summary)
}

/// The overwrite that adds [`PROCESSED_TAG`] in front of the existing tags.
pub fn processed_upsert(bookmark: Bookmark) -> UpsertRequest {
    let mut tags = Vec::with_capacity(bookmark.tags.len() + 1);
    tags.push(PROCESSED_TAG.to_string());
    tags.extend(bookmark.tags);

    UpsertRequest {
        href: bookmark.href,
        description: bookmark.description,
        extended: bookmark.extended,
        tags,
        time: bookmark.time,
        replace: true,
        shared: bookmark.shared,
        toread: bookmark.toread,
    }
}
