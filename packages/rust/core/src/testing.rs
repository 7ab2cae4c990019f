//! In-memory [`BookmarkSource`] and fixtures for unit tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use roundup_shared::{
    Bookmark, BookmarkSource, PostQuery, RawBookmark, Result, RoundupError, UpsertRequest,
};

/// `2024-01-01T00:00:00Z` plus `hours`.
pub(crate) fn at(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
}

/// A validated bookmark with no tags.
pub(crate) fn bookmark(
    href: &str,
    description: &str,
    extended: &str,
    time: DateTime<Utc>,
) -> Bookmark {
    Bookmark {
        href: href.into(),
        description: description.into(),
        extended: extended.into(),
        time,
        tags: vec![],
        shared: true,
        toread: false,
    }
}

/// A complete raw bookmark tagged `twis`.
pub(crate) fn raw(href: &str, description: &str, time: DateTime<Utc>) -> RawBookmark {
    RawBookmark {
        href: Some(href.into()),
        description: Some(description.into()),
        extended: Some(String::new()),
        time: Some(time),
        tags: vec!["twis".into()],
        shared: true,
        toread: false,
    }
}

/// Bookmark store that applies upserts to its own contents.
pub(crate) struct FakeSource {
    bookmarks: Mutex<Vec<RawBookmark>>,
    queries: Mutex<Vec<PostQuery>>,
    upserts: Mutex<Vec<UpsertRequest>>,
    /// Fail the upsert with this zero-based index.
    fail_upsert_at: Option<usize>,
}

impl FakeSource {
    pub(crate) fn new(bookmarks: Vec<RawBookmark>) -> Self {
        Self {
            bookmarks: Mutex::new(bookmarks),
            queries: Mutex::new(Vec::new()),
            upserts: Mutex::new(Vec::new()),
            fail_upsert_at: None,
        }
    }

    pub(crate) fn failing_upsert_at(mut self, index: usize) -> Self {
        self.fail_upsert_at = Some(index);
        self
    }

    pub(crate) fn queries(&self) -> Vec<PostQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn upserts(&self) -> Vec<UpsertRequest> {
        self.upserts.lock().unwrap().clone()
    }

    pub(crate) fn bookmarks(&self) -> Vec<RawBookmark> {
        self.bookmarks.lock().unwrap().clone()
    }
}

impl BookmarkSource for FakeSource {
    async fn fetch_by_tag(&self, query: &PostQuery) -> Result<Vec<RawBookmark>> {
        self.queries.lock().unwrap().push(query.clone());

        let in_range = |b: &RawBookmark| match b.time {
            Some(t) => query.from.is_none_or(|from| t >= from) && query.to.is_none_or(|to| t <= to),
            None => true,
        };

        let matches = self
            .bookmarks
            .lock()
            .unwrap()
            .iter()
            .filter(|b| query.tags.iter().all(|t| b.tags.contains(t)))
            .filter(|b| in_range(b))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(matches)
    }

    async fn upsert(&self, request: &UpsertRequest) -> Result<()> {
        let mut upserts = self.upserts.lock().unwrap();
        if self.fail_upsert_at == Some(upserts.len()) {
            return Err(RoundupError::Network("posts/add: HTTP 500".into()));
        }
        upserts.push(request.clone());

        let mut bookmarks = self.bookmarks.lock().unwrap();
        let stored = RawBookmark {
            href: Some(request.href.clone()),
            description: Some(request.description.clone()),
            extended: Some(request.extended.clone()),
            time: Some(request.time),
            tags: request.tags.clone(),
            shared: request.shared,
            toread: request.toread,
        };
        match bookmarks
            .iter_mut()
            .find(|b| b.href.as_deref() == Some(request.href.as_str()))
        {
            Some(existing) if request.replace => *existing = stored,
            Some(_) => {}
            None => bookmarks.push(stored),
        }

        Ok(())
    }
}
