//! Wikimedia per-article pageviews adapter.
//!
//! Unlike the search-backed sources, Wikimedia already aggregates views per
//! day, so one request covers the whole range with no pagination. A 404 for
//! the article is meaningful data (nobody can view a page that does not
//! exist) and yields an all-zero series rather than a failure.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use trendlens_core::{SourceId, TimeSeries};

use crate::error::SourceError;
use crate::SourceClient;

const DEFAULT_BASE_URL: &str = "https://wikimedia.org/api/rest_v1";

const SOURCE_ID: SourceId = SourceId::Wikipedia;

/// Characters that must be escaped inside a REST path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Deserialize)]
struct PageviewsResponse {
    items: Option<Vec<PageviewsItem>>,
}

#[derive(Debug, Deserialize)]
struct PageviewsItem {
    /// `YYYYMMDD00` — date plus a constant hour suffix.
    timestamp: String,
    views: u64,
}

/// Client for the Wikimedia pageviews REST API.
pub struct WikipediaClient {
    client: Client,
    project: String,
    access: String,
    agent: String,
    base_url: String,
}

impl WikipediaClient {
    /// Creates a client pointed at the production Wikimedia REST API.
    ///
    /// `project`/`access`/`agent` select the pageviews dimension, e.g.
    /// `en.wikipedia` / `all-access` / `user`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        project: &str,
        access: &str,
        agent: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(project, access, agent, user_agent, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        project: &str,
        access: &str,
        agent: &str,
        user_agent: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        Ok(Self {
            client,
            project: project.to_owned(),
            access: access.to_owned(),
            agent: agent.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn build_url(&self, topic: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/metrics/pageviews/per-article/{}/{}/{}/{}/daily/{}00/{}00",
            self.base_url,
            self.project,
            self.access,
            self.agent,
            article_title(topic),
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        )
    }
}

#[async_trait]
impl SourceClient for WikipediaClient {
    fn source_id(&self) -> SourceId {
        SOURCE_ID
    }

    async fn fetch_daily(
        &self,
        topic: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, SourceError> {
        let url = self.build_url(topic, start, end);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        let status = response.status();

        // Unknown article: a valid zero series, not a failure.
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(topic, "no Wikipedia article for topic, returning zero series");
            return Ok(TimeSeries::from_day_counts(
                SOURCE_ID,
                topic,
                start,
                end,
                &BTreeMap::new(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        if !status.is_success() {
            return Err(SourceError::status(SOURCE_ID, status, &body));
        }

        let parsed: PageviewsResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::deserialize(SOURCE_ID, "pageviews/per-article", e))?;

        let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for item in parsed.items.unwrap_or_default() {
            let Some(date) = parse_timestamp(&item.timestamp) else {
                tracing::trace!(timestamp = %item.timestamp, "skipping item with bad timestamp");
                continue;
            };
            // Upstream counts are already per-day totals; last write wins.
            counts.insert(date, item.views);
        }

        Ok(TimeSeries::from_day_counts(
            SOURCE_ID, topic, start, end, &counts,
        ))
    }
}

fn parse_timestamp(timestamp: &str) -> Option<NaiveDate> {
    let date_part = timestamp.get(..8)?;
    NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
}

/// Best-effort mapping from a free-form topic to an article title: trimmed,
/// whitespace collapsed to underscores, percent-encoded for the path. Lossy
/// for topics whose article uses different casing or punctuation.
fn article_title(topic: &str) -> String {
    let normalized = topic.split_whitespace().collect::<Vec<_>>().join("_");
    utf8_percent_encode(&normalized, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_title_joins_whitespace_with_underscores() {
        assert_eq!(article_title("  rust programming  "), "rust_programming");
        assert_eq!(article_title("rust\t language"), "rust_language");
    }

    #[test]
    fn article_title_percent_encodes_reserved_chars() {
        assert_eq!(article_title("AC/DC"), "AC%2FDC");
    }

    #[test]
    fn timestamp_parses_date_prefix() {
        assert_eq!(
            parse_timestamp("2024112000"),
            NaiveDate::from_ymd_opt(2024, 11, 20)
        );
        assert_eq!(parse_timestamp("short"), None);
        assert_eq!(parse_timestamp("9999999900"), None);
    }

    #[test]
    fn build_url_has_the_expected_shape() {
        let client = WikipediaClient::with_base_url(
            "en.wikipedia",
            "all-access",
            "user",
            "trendlens-test",
            30,
            "http://localhost:9999/",
        )
        .unwrap();
        let url = client.build_url(
            "rust lang",
            NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, 22).unwrap(),
        );
        assert_eq!(
            url,
            "http://localhost:9999/metrics/pageviews/per-article/en.wikipedia/all-access/user/rust_lang/daily/2024112000/2024112200"
        );
    }
}
