//! NewsAPI `/v2/everything` adapter.
//!
//! NewsAPI's search endpoint returns the most recent N articles matching the
//! query, sorted by publish time descending — it is not a full-coverage
//! archive. With the free-tier page budget below, a query sees at most
//! `PAGE_SIZE * MAX_PAGES` articles, so the resulting series is approximate
//! and biased towards the latest days of the range.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use trendlens_core::{SourceId, TimeSeries};

use crate::error::SourceError;
use crate::SourceClient;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const PAGE_SIZE: usize = 10;
// Free tier: one page per query to stay inside the 100 requests/day quota.
const MAX_PAGES: u32 = 1;

const SOURCE_ID: SourceId = SourceId::NewsApi;

/// Response envelope for `/v2/everything`.
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    articles: Option<Vec<NewsApiArticle>>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

/// Client for the NewsAPI article search endpoint.
///
/// Use [`NewsApiClient::new`] for production or
/// [`NewsApiClient::with_base_url`] to point at a mock server in tests.
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    language: String,
    base_url: Url,
}

impl NewsApiClient {
    /// Creates a new client pointed at the production NewsAPI endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, language: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, language, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::Status`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        language: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        let base_url = parse_base_url(base_url)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            language: language.to_owned(),
            base_url,
        })
    }

    fn build_url(&self, topic: &str, start: NaiveDate, end: NaiveDate, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/v2/everything");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", topic);
            pairs.append_pair("from", &start.to_string());
            pairs.append_pair("to", &end.to_string());
            pairs.append_pair("language", &self.language);
            pairs.append_pair("sortBy", "publishedAt");
            pairs.append_pair("pageSize", &PAGE_SIZE.to_string());
            pairs.append_pair("page", &page.to_string());
        }
        url
    }
}

#[async_trait]
impl SourceClient for NewsApiClient {
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

        for page in 1..=MAX_PAGES {
            let url = self.build_url(topic, start, end, page);
            let response = self
                .client
                .get(url)
                .header("X-Api-Key", &self.api_key)
                .send()
                .await
                .map_err(|e| SourceError::http(SOURCE_ID, e))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| SourceError::http(SOURCE_ID, e))?;

            if !status.is_success() {
                // 426 is NewsAPI's "free tier exhausted" answer. Whatever is
                // already counted stands; stop paginating instead of failing.
                if status == StatusCode::UPGRADE_REQUIRED {
                    tracing::warn!(page, "NewsAPI quota reached, stopping pagination");
                    break;
                }
                return Err(SourceError::status(SOURCE_ID, status, &body));
            }

            let parsed: NewsApiResponse = serde_json::from_str(&body).map_err(|e| {
                SourceError::deserialize(SOURCE_ID, format!("everything(q={topic})"), e)
            })?;

            if parsed.status != "ok" {
                return Err(SourceError::Api {
                    source_id: SOURCE_ID,
                    code: parsed.code.unwrap_or_else(|| "unknown".to_owned()),
                    message: parsed.message.unwrap_or_default(),
                });
            }

            let articles = parsed.articles.unwrap_or_default();
            if articles.is_empty() {
                break;
            }
            tracing::debug!(page, count = articles.len(), "NewsAPI page fetched");

            for article in &articles {
                let Some(published_at) = &article.published_at else {
                    continue;
                };
                let Some(date) = parse_published_at(published_at) else {
                    tracing::trace!(published_at, "skipping article with unparseable date");
                    continue;
                };
                // Out-of-range articles are discarded, never shifted.
                if date >= start && date <= end {
                    *counts.entry(date).or_insert(0) += 1;
                }
            }

            if articles.len() < PAGE_SIZE {
                break;
            }
        }

        Ok(TimeSeries::from_day_counts(
            SOURCE_ID, topic, start, end, &counts,
        ))
    }
}

fn parse_published_at(published_at: &str) -> Option<NaiveDate> {
    published_at
        .parse::<DateTime<Utc>>()
        .ok()
        .map(|ts| ts.date_naive())
}

fn parse_base_url(base_url: &str) -> Result<Url, SourceError> {
    Url::parse(base_url).map_err(|e| SourceError::Api {
        source_id: SOURCE_ID,
        code: "invalid-base-url".to_owned(),
        message: format!("{base_url}: {e}"),
    })
}
