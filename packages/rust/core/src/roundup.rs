//! Roundup generation: bookmarks in, markdown bullets out.
//!
//! Unprocessed bookmarks are ordered priority-first, newest-first, then each
//! one is rendered either as a `[title](href)` link or as its own caption
//! when the notes carry something richer than the title.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use tracing::{debug, info, instrument};

use roundup_shared::{Bookmark, BookmarkSource, PostQuery, RawBookmark, Result};

/// Upper bound on bookmarks fetched for a single roundup.
pub const ROUNDUP_FETCH_LIMIT: usize = 1000;

/// `_URL_` or `_TITLE_`, any case.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_URL_|_TITLE_").expect("valid regex"));

/// Which bookmarks go into a roundup.
#[derive(Debug, Clone)]
pub struct RoundupRequest {
    /// Tag the bookmarks must carry.
    pub tag: String,
    /// Inclusive start of the creation-time window.
    pub from: DateTime<Utc>,
    /// Inclusive end of the creation-time window.
    pub to: DateTime<Utc>,
}

/// Fetch the bookmarks for `request` and render them as roundup lines.
///
/// Processed bookmarks are dropped before validation, so only bookmarks that
/// make it into the report need a complete set of fields. Any missing field
/// aborts the whole roundup.
#[instrument(skip_all, fields(tag = %request.tag, from = %request.from, to = %request.to))]
pub async fn generate<S: BookmarkSource>(
    source: &S,
    request: &RoundupRequest,
    priority_hints: &[String],
) -> Result<Vec<String>> {
    let query = PostQuery {
        tags: vec![request.tag.clone()],
        from: Some(request.from),
        to: Some(request.to),
        limit: Some(ROUNDUP_FETCH_LIMIT),
    };

    let fetched = source.fetch_by_tag(&query).await?;
    let fetched_count = fetched.len();

    let bookmarks = fetched
        .into_iter()
        .filter(|b| !b.is_processed())
        .map(RawBookmark::validate)
        .collect::<Result<Vec<_>>>()?;

    debug!(
        fetched = fetched_count,
        unprocessed = bookmarks.len(),
        "filtered processed bookmarks"
    );

    let lines = render(bookmarks, priority_hints);
    info!(lines = lines.len(), "roundup generated");

    Ok(lines)
}

/// Order `bookmarks` and render one markdown bullet per bookmark.
///
/// Bookmarks whose href contains any of `priority_hints` (case-insensitive)
/// come first; ties are broken newest-first.
pub fn render(mut bookmarks: Vec<Bookmark>, priority_hints: &[String]) -> Vec<String> {
    let hints: Vec<String> = priority_hints.iter().map(|h| h.to_lowercase()).collect();
    bookmarks.sort_by_cached_key(|b| Reverse(sort_key(b, &hints)));
    bookmarks.iter().map(render_line).collect()
}

/// `(is_priority, created_at)`; larger sorts first.
fn sort_key(bookmark: &Bookmark, lowercase_hints: &[String]) -> (bool, DateTime<Utc>) {
    let href = bookmark.href.to_lowercase();
    let priority = lowercase_hints.iter().any(|h| href.contains(h.as_str()));
    (priority, bookmark.time)
}

/// Render a single bookmark as a `* ` bullet.
pub fn render_line(bookmark: &Bookmark) -> String {
    let caption = caption(bookmark);
    let title = bookmark.description.trim();

    // An empty caption has nothing richer to say than the link itself.
    let body = if caption.is_empty() || caption == title {
        format!("[{title}]({})", bookmark.href)
    } else {
        caption
    };

    format!("* {}", body.trim())
}

/// The text that best describes a bookmark, trimmed.
fn caption(bookmark: &Bookmark) -> String {
    let candidate: Cow<'_, str> = if has_placeholders(&bookmark.extended) {
        substitute_placeholders(bookmark)
    } else if bookmark.description == bookmark.href {
        // The service stores the URL as the title when none was given.
        Cow::Borrowed(bookmark.extended.as_str())
    } else {
        Cow::Borrowed(bookmark.description.as_str())
    };

    if candidate.trim().is_empty() {
        bookmark.extended.trim().to_string()
    } else {
        candidate.trim().to_string()
    }
}

fn has_placeholders(extended: &str) -> bool {
    !extended.trim().is_empty() && PLACEHOLDER.is_match(extended)
}

/// Single pass, so text inserted for one placeholder is never rescanned.
fn substitute_placeholders(bookmark: &Bookmark) -> Cow<'_, str> {
    PLACEHOLDER.replace_all(&bookmark.extended, |caps: &Captures<'_>| {
        if caps[0].eq_ignore_ascii_case("_URL_") {
            bookmark.href.as_str()
        } else {
            bookmark.description.as_str()
        }
    })
}
