//! Reddit search adapter (`/search?sort=new`, OAuth bearer token).
//!
//! Counts posts per day by `created_utc`, paginating newest-first with the
//! listing's `after` cursor. Coverage is capped at `PAGE_SIZE * MAX_PAGES`
//! newest posts per query, so long ranges on active topics silently miss
//! older posts and skew towards recent days.
//!
//! The early exit below leans on the upstream sort order: with `sort=new`,
//! the first post dated before `start` means no later page can hold anything
//! inside the window. If Reddit ever returned out-of-order results the
//! series would be incomplete rather than erroring.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, Url};
use serde::Deserialize;
use trendlens_core::{SourceId, TimeSeries};

use crate::error::SourceError;
use crate::reddit_auth::RedditAuth;
use crate::SourceClient;

const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com";
const PAGE_SIZE: usize = 100;
const MAX_PAGES: u32 = 10;

const SOURCE_ID: SourceId = SourceId::Reddit;

/// Reddit search listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    // Reddit sends this as a fractional epoch second.
    created_utc: f64,
}

/// Client for the Reddit search endpoint, backed by a shared token cache.
pub struct RedditClient {
    client: Client,
    auth: Arc<RedditAuth>,
    base_url: Url,
}

impl RedditClient {
    /// Creates a client pointed at the production `oauth.reddit.com` host.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(auth: Arc<RedditAuth>, timeout_secs: u64) -> Result<Self, SourceError> {
        Self::with_base_url(auth, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        auth: Arc<RedditAuth>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        let base_url = Url::parse(base_url).map_err(|e| SourceError::Api {
            source_id: SOURCE_ID,
            code: "invalid-base-url".to_owned(),
            message: format!("{base_url}: {e}"),
        })?;

        Ok(Self {
            client,
            auth,
            base_url,
        })
    }

    fn build_url(&self, topic: &str, after: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/search");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", topic);
            pairs.append_pair("sort", "new");
            pairs.append_pair("limit", &PAGE_SIZE.to_string());
            pairs.append_pair("type", "link");
            if let Some(cursor) = after {
                pairs.append_pair("after", cursor);
            }
        }
        url
    }
}

#[async_trait]
impl SourceClient for RedditClient {
    fn source_id(&self) -> SourceId {
        SOURCE_ID
    }

    async fn fetch_daily(
        &self,
        topic: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, SourceError> {
        let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        let mut after: Option<String> = None;
        let mut reached_start = false;

        for page in 0..MAX_PAGES {
            let token = self.auth.token().await?;
            let url = self.build_url(topic, after.as_deref());
            let response = self
                .client
                .get(url)
                .header("Authorization", format!("bearer {token}"))
                .header("User-Agent", self.auth.user_agent())
                .send()
                .await
                .map_err(|e| SourceError::http(SOURCE_ID, e))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| SourceError::http(SOURCE_ID, e))?;

            if !status.is_success() {
                return Err(SourceError::status(SOURCE_ID, status, &body));
            }

            let listing: Listing = serde_json::from_str(&body)
                .map_err(|e| SourceError::deserialize(SOURCE_ID, format!("search(q={topic})"), e))?;

            if listing.data.children.is_empty() {
                break;
            }
            tracing::debug!(page, count = listing.data.children.len(), "Reddit page fetched");

            for post in &listing.data.children {
                let Some(date) = created_utc_date(post.data.created_utc) else {
                    continue;
                };
                if date > end {
                    // Newer than the window; older posts are still coming.
                    continue;
                }
                if date < start {
                    // sort=new: everything after this is older still.
                    reached_start = true;
                    break;
                }
                *counts.entry(date).or_insert(0) += 1;
            }

            if reached_start {
                break;
            }
            after = listing.data.after;
            if after.is_none() {
                break;
            }
        }

        Ok(TimeSeries::from_day_counts(
            SOURCE_ID, topic, start, end, &counts,
        ))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn created_utc_date(created_utc: f64) -> Option<NaiveDate> {
    DateTime::from_timestamp(created_utc as i64, 0).map(|ts| ts.date_naive())
}
