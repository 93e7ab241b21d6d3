//! Request-level facade: result caching and history recording around the
//! orchestrator.
//!
//! The orchestrator itself is cache-unaware and idempotent; this layer adds
//! the things a serving caller wants — identical queries inside the TTL are
//! answered from memory, and fresh aggregations are appended to the search
//! history without ever being able to fail the query.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use moka::future::Cache;
use trendlens_core::{AggregateResult, SearchRecord};

use crate::history::SearchHistoryStore;
use crate::service::TimeseriesService;
use crate::EngineError;

/// Cache key: the full query identity. Requested source ids are
/// canonicalized (sorted, deduplicated) so `["a","b"]` and `["b","a","b"]`
/// hit the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    topic: String,
    start: NaiveDate,
    end: NaiveDate,
    sources: Vec<String>,
}

impl CacheKey {
    fn new(topic: &str, start: NaiveDate, end: NaiveDate, requested: Option<&[String]>) -> Self {
        let mut sources: Vec<String> = requested.unwrap_or_default().to_vec();
        sources.sort();
        sources.dedup();
        Self {
            topic: topic.to_owned(),
            start,
            end,
            sources,
        }
    }
}

/// A search result plus where it came from.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub result: Arc<AggregateResult>,
    pub from_cache: bool,
}

/// Caching, history-recording wrapper around [`TimeseriesService`].
pub struct SearchService {
    service: TimeseriesService,
    cache: Cache<CacheKey, Arc<AggregateResult>>,
    history: Arc<dyn SearchHistoryStore>,
}

impl SearchService {
    #[must_use]
    pub fn new(
        service: TimeseriesService,
        history: Arc<dyn SearchHistoryStore>,
        cache_ttl: Duration,
        cache_capacity: u64,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache_capacity)
            .time_to_live(cache_ttl)
            .build();
        Self {
            service,
            cache,
            history,
        }
    }

    /// The underlying orchestrator, for callers that want to bypass the
    /// cache and history.
    #[must_use]
    pub fn inner(&self) -> &TimeseriesService {
        &self.service
    }

    #[must_use]
    pub fn history(&self) -> &dyn SearchHistoryStore {
        self.history.as_ref()
    }

    /// Answers a search from cache if possible, otherwise aggregates,
    /// records the search, and caches the result.
    ///
    /// # Errors
    ///
    /// Propagates only the orchestrator's caller-contract errors
    /// ([`EngineError`]); failed searches are never cached.
    pub async fn search(
        &self,
        topic: &str,
        start: NaiveDate,
        end: NaiveDate,
        requested: Option<&[String]>,
    ) -> Result<SearchOutcome, EngineError> {
        let key = CacheKey::new(topic, start, end, requested);

        if let Some(result) = self.cache.get(&key).await {
            tracing::debug!(topic, "search served from cache");
            return Ok(SearchOutcome {
                result,
                from_cache: true,
            });
        }

        let result = Arc::new(self.service.aggregate(topic, start, end, requested).await?);

        // History is fire-and-forget: a full store must not fail the query.
        let record = SearchRecord {
            topic: result.topic.clone(),
            start,
            end,
            sources_used: result.sources_used.clone(),
            total_mentions: result.total_mentions,
            searched_at: Utc::now(),
        };
        if let Err(e) = self.history.record(record) {
            tracing::warn!(error = %e, "failed to record search history");
        }

        self.cache.insert(key, Arc::clone(&result)).await;

        Ok(SearchOutcome {
            result,
            from_cache: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn cache_key_canonicalizes_requested_sources() {
        let a = CacheKey::new(
            "rust",
            d("2024-11-20"),
            d("2024-11-22"),
            Some(&["reddit".to_owned(), "newsapi".to_owned()]),
        );
        let b = CacheKey::new(
            "rust",
            d("2024-11-20"),
            d("2024-11-22"),
            Some(&["newsapi".to_owned(), "reddit".to_owned(), "newsapi".to_owned()]),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_distinguishes_default_from_explicit() {
        let default = CacheKey::new("rust", d("2024-11-20"), d("2024-11-22"), None);
        let explicit = CacheKey::new(
            "rust",
            d("2024-11-20"),
            d("2024-11-22"),
            Some(&["newsapi".to_owned()]),
        );
        assert_ne!(default, explicit);
    }
}
