//! Source adapters that turn raw third-party APIs into daily mention series.
//!
//! Each adapter implements [`SourceClient`]: given a topic and an inclusive
//! date range, it returns a [`TimeSeries`] covering every day of the range,
//! with explicit zeros for days the upstream API reported nothing. The
//! adapters differ in how they get there (pagination, OAuth, direct per-day
//! counts) but share the gap-filling contract, so the engine can merge any
//! mix of them without worrying about missing days.
//!
//! None of the sources is a full-coverage feed. NewsAPI and Reddit only
//! expose the most recent N matches, so long ranges on active topics are
//! under-counted and biased towards recent days. That incompleteness is a
//! property of the data, not a failure; technical failures surface as
//! [`SourceError`].

use async_trait::async_trait;
use chrono::NaiveDate;
use trendlens_core::{SourceId, TimeSeries};

mod error;
mod newsapi;
mod reddit;
mod reddit_auth;
mod wikipedia;

pub use error::SourceError;
pub use newsapi::NewsApiClient;
pub use reddit::RedditClient;
pub use reddit_auth::RedditAuth;
pub use wikipedia::WikipediaClient;

/// A single external data source, normalized to daily mention counts.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// The identifier this adapter is registered under.
    fn source_id(&self) -> SourceId;

    /// Fetches a date-complete daily series for `topic` over `[start, end]`.
    ///
    /// Callers must pass a non-blank topic and `start <= end`; the engine
    /// validates both before dispatching. Zero matches is valid data and
    /// yields an all-zero series, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network failure, timeout, unexpected HTTP
    /// status, or a malformed response body.
    async fn fetch_daily(
        &self,
        topic: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, SourceError>;
}
