//! The aggregation engine: merges per-source daily series into one
//! date-complete result with partial-failure accounting.
//!
//! [`TimeseriesService`] owns the source registry and fans queries out to
//! the adapters concurrently; one source failing never fails the query.
//! [`SearchService`] wraps it with a TTL result cache and search-history
//! recording for callers that want the full request-level behavior.

use chrono::NaiveDate;
use thiserror::Error;

mod aggregator;
mod history;
mod search;
mod service;

pub use history::{HistoryError, InMemoryHistoryStore, SearchHistoryStore};
pub use search::{SearchOutcome, SearchService};
pub use service::TimeseriesService;

/// Caller-contract violations. These are the only errors `aggregate`
/// propagates; everything source-related is folded into the result's
/// `sources_failed` map instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The requested range is inverted. Never retried, never corrected.
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The topic is empty or whitespace-only.
    #[error("topic cannot be blank")]
    BlankTopic,
}
