//! Core domain types for bookmarks and the requests made against a bookmark source.

use chrono::{DateTime, Utc};

use crate::error::{Result, RoundupError};

/// Tag that marks a bookmark as already consumed by a roundup.
///
/// A bookmark carrying this tag never appears in a roundup again, and the
/// tag is never removed once added.
pub const PROCESSED_TAG: &str = "processed";

/// Returns `true` if the tag list contains [`PROCESSED_TAG`].
pub fn is_processed(tags: &[String]) -> bool {
    tags.iter().any(|t| t == PROCESSED_TAG)
}

// ---------------------------------------------------------------------------
// RawBookmark
// ---------------------------------------------------------------------------

/// A bookmark as delivered by a [`BookmarkSource`](crate::BookmarkSource).
///
/// Remote services may omit any of the text fields; use
/// [`RawBookmark::validate`] to obtain a [`Bookmark`] with every required
/// field present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBookmark {
    pub href: Option<String>,
    pub description: Option<String>,
    pub extended: Option<String>,
    pub time: Option<DateTime<Utc>>,
    /// Tags in the order the service returned them.
    pub tags: Vec<String>,
    pub shared: bool,
    pub toread: bool,
}

impl RawBookmark {
    /// Whether this bookmark already carries [`PROCESSED_TAG`].
    pub fn is_processed(&self) -> bool {
        is_processed(&self.tags)
    }

    /// Check required fields and convert into a [`Bookmark`].
    ///
    /// Fails with [`RoundupError::MissingField`] naming the first absent field.
    pub fn validate(self) -> Result<Bookmark> {
        let Some(href) = self.href else {
            return Err(RoundupError::MissingField {
                field: "href",
                href: "<unknown>".into(),
            });
        };

        let missing = |field: &'static str| RoundupError::MissingField {
            field,
            href: href.clone(),
        };

        let description = self.description.ok_or_else(|| missing("description"))?;
        let extended = self.extended.ok_or_else(|| missing("extended"))?;
        let time = self.time.ok_or_else(|| missing("time"))?;

        Ok(Bookmark {
            href,
            description,
            extended,
            time,
            tags: self.tags,
            shared: self.shared,
            toread: self.toread,
        })
    }
}

// ---------------------------------------------------------------------------
// Bookmark
// ---------------------------------------------------------------------------

/// A bookmark with every field the roundup relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Bookmarked URL.
    pub href: String,
    /// Title given by the user (the service echoes the URL when none was given).
    pub description: String,
    /// Free-text notes; may contain `_URL_` / `_TITLE_` placeholders.
    pub extended: String,
    /// When the bookmark was created.
    pub time: DateTime<Utc>,
    pub tags: Vec<String>,
    pub shared: bool,
    pub toread: bool,
}

// ---------------------------------------------------------------------------
// Source requests
// ---------------------------------------------------------------------------

/// Filter for fetching bookmarks from a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Bookmarks must carry all of these tags.
    pub tags: Vec<String>,
    /// Only bookmarks created at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only bookmarks created at or before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of bookmarks to return (`None` = all).
    pub limit: Option<usize>,
}

impl PostQuery {
    /// Query every bookmark carrying `tag`, unbounded in time and count.
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tags: vec![tag.into()],
            ..Self::default()
        }
    }
}

/// Create-or-overwrite request for a single bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRequest {
    pub href: String,
    pub description: String,
    pub extended: String,
    pub tags: Vec<String>,
    pub time: DateTime<Utc>,
    /// Overwrite an existing bookmark with the same URL.
    pub replace: bool,
    pub shared: bool,
    pub toread: bool,
}
