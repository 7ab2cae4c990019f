//! Pinboard v1 API client.
//!
//! [`PinboardClient`] implements [`BookmarkSource`] over
//! `posts/all` (fetch by tag and date range) and `posts/add` (upsert).
//! Authentication uses the `user:TOKEN` auth token passed as a query parameter,
//! which is why request URLs are never logged or included in errors.

mod wire;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use roundup_shared::{
    BookmarkSource, PinboardConfig, PostQuery, RawBookmark, Result, RoundupError, UpsertRequest,
};

use crate::wire::{PostDto, RESULT_DONE, ResultCode, format_time, yes_no};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("Roundup/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// PinboardClient
// ---------------------------------------------------------------------------

/// HTTP client for the Pinboard API.
pub struct PinboardClient {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl std::fmt::Debug for PinboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinboardClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PinboardClient {
    /// Create a client for the API rooted at `config.base_url`.
    pub fn new(config: &PinboardConfig, auth_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RoundupError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
        })
    }

    /// Build an authenticated URL for an API method such as `posts/all`.
    fn endpoint(&self, method: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{method}", self.base_url)).map_err(|e| {
            RoundupError::config(format!("invalid Pinboard base URL '{}': {e}", self.base_url))
        })?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("auth_token", &self.auth_token);
        Ok(url)
    }

    /// GET `url` and decode the JSON body. `method` labels errors.
    async fn get_json<T: DeserializeOwned>(&self, method: &str, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RoundupError::Network(format!("{method}: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoundupError::Network(format!("{method}: HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| {
            RoundupError::Network(format!("{method}: failed to read body: {}", e.without_url()))
        })?;

        serde_json::from_str(&body)
            .map_err(|e| RoundupError::parse(format!("{method}: unexpected response: {e}")))
    }
}

impl BookmarkSource for PinboardClient {
    #[instrument(skip_all, fields(tags = ?query.tags, limit = ?query.limit))]
    async fn fetch_by_tag(&self, query: &PostQuery) -> Result<Vec<RawBookmark>> {
        let mut url = self.endpoint("posts/all")?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.tags.is_empty() {
                pairs.append_pair("tag", &query.tags.join(" "));
            }
            if let Some(from) = &query.from {
                pairs.append_pair("fromdt", &format_time(from));
            }
            if let Some(to) = &query.to {
                pairs.append_pair("todt", &format_time(to));
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("results", &limit.to_string());
            }
        }

        let posts: Vec<PostDto> = self.get_json("posts/all", url).await?;
        info!(count = posts.len(), "fetched bookmarks");

        Ok(posts.into_iter().map(RawBookmark::from).collect())
    }

    #[instrument(skip_all, fields(href = %request.href))]
    async fn upsert(&self, request: &UpsertRequest) -> Result<()> {
        let mut url = self.endpoint("posts/add")?;
        url.query_pairs_mut()
            .append_pair("url", &request.href)
            .append_pair("description", &request.description)
            .append_pair("extended", &request.extended)
            .append_pair("tags", &request.tags.join(" "))
            .append_pair("dt", &format_time(&request.time))
            .append_pair("replace", yes_no(request.replace))
            .append_pair("shared", yes_no(request.shared))
            .append_pair("toread", yes_no(request.toread));

        let result: ResultCode = self.get_json("posts/add", url).await?;
        if result.result_code != RESULT_DONE {
            return Err(RoundupError::api(format!(
                "posts/add for {} failed: {}",
                request.href, result.result_code
            )));
        }

        debug!(tags = ?request.tags, "bookmark upserted");
        Ok(())
    }
}
