//! JSON shapes of the Pinboard v1 API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use roundup_shared::RawBookmark;

/// Timestamp format Pinboard accepts for `dt`, `fromdt` and `todt`.
pub(crate) const PINBOARD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One element of the `posts/all` response array.
#[derive(Debug, Deserialize)]
pub(crate) struct PostDto {
    pub href: Option<String>,
    pub description: Option<String>,
    pub extended: Option<String>,
    pub time: Option<DateTime<Utc>>,
    /// Space-separated tag list.
    #[serde(default)]
    pub tags: Option<String>,
    /// `"yes"` or `"no"`.
    #[serde(default)]
    pub shared: Option<String>,
    /// `"yes"` or `"no"`.
    #[serde(default)]
    pub toread: Option<String>,
}

impl From<PostDto> for RawBookmark {
    fn from(dto: PostDto) -> Self {
        Self {
            href: dto.href,
            description: dto.description,
            extended: dto.extended,
            time: dto.time,
            tags: split_tags(dto.tags.as_deref().unwrap_or("")),
            shared: is_yes(dto.shared.as_deref()),
            toread: is_yes(dto.toread.as_deref()),
        }
    }
}

/// Body of a `posts/add` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ResultCode {
    pub result_code: String,
}

/// Pinboard's success marker for write calls.
pub(crate) const RESULT_DONE: &str = "done";

fn split_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(String::from).collect()
}

fn is_yes(flag: Option<&str>) -> bool {
    flag.is_some_and(|f| f.eq_ignore_ascii_case("yes"))
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.format(PINBOARD_TIME_FORMAT).to_string()
}
