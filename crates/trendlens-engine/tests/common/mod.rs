//! Fake source adapters for engine tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use trendlens_core::{SourceId, TimeSeries};
use trendlens_sources::{SourceClient, SourceError};

/// Returns a fixed set of per-day counts, gap-filled over whatever range is
/// asked for. Counts falling outside the queried range drop out, exactly as
/// with a real adapter.
pub struct FixedSource {
    id: SourceId,
    counts: BTreeMap<NaiveDate, u64>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(id: SourceId, days: &[(&str, u64)]) -> Arc<Self> {
        let counts = days
            .iter()
            .map(|(day, n)| (day.parse().unwrap(), *n))
            .collect();
        Arc::new(Self {
            id,
            counts,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceClient for FixedSource {
    fn source_id(&self) -> SourceId {
        self.id
    }

    async fn fetch_daily(
        &self,
        topic: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TimeSeries::from_day_counts(
            self.id,
            topic,
            start,
            end,
            &self.counts,
        ))
    }
}

/// Always fails with a source-level error.
pub struct FailingSource {
    id: SourceId,
    message: String,
}

impl FailingSource {
    pub fn new(id: SourceId, message: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            message: message.to_owned(),
        })
    }
}

#[async_trait]
impl SourceClient for FailingSource {
    fn source_id(&self) -> SourceId {
        self.id
    }

    async fn fetch_daily(
        &self,
        _topic: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<TimeSeries, SourceError> {
        Err(SourceError::Api {
            source_id: self.id,
            code: "unavailable".to_owned(),
            message: self.message.clone(),
        })
    }
}
