//! Search-history recording.
//!
//! Recording is fire-and-forget from the engine's point of view: the
//! aggregation result never depends on the store accepting the record.
//! Durable storage belongs to an outer layer; the in-memory store here is
//! the default and what the tests use.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;
use trendlens_core::SearchRecord;

/// Errors a history store may report. Callers log these, never propagate.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

/// Sink for completed searches, plus the two read paths the API exposes.
pub trait SearchHistoryStore: Send + Sync {
    /// Appends one completed search.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the record cannot be stored.
    fn record(&self, record: SearchRecord) -> Result<(), HistoryError>;

    /// The most recent searches, newest first.
    fn recent(&self, limit: usize) -> Vec<SearchRecord>;

    /// Topics ranked by how often they were searched, most frequent first.
    /// Ties break lexicographically so the ranking is deterministic.
    fn most_searched(&self, limit: usize) -> Vec<String>;
}

/// Bounded in-memory history. Oldest records are dropped once `max_records`
/// is exceeded.
pub struct InMemoryHistoryStore {
    max_records: usize,
    records: Mutex<Vec<SearchRecord>>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new(max_records: usize) -> Self {
        Self {
            max_records,
            records: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SearchRecord>> {
        // A poisoned lock only means another thread panicked mid-push;
        // the Vec is still structurally sound.
        self.records.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SearchHistoryStore for InMemoryHistoryStore {
    fn record(&self, record: SearchRecord) -> Result<(), HistoryError> {
        let mut records = self.lock();
        records.push(record);
        if records.len() > self.max_records {
            let overflow = records.len() - self.max_records;
            records.drain(..overflow);
        }
        Ok(())
    }

    fn recent(&self, limit: usize) -> Vec<SearchRecord> {
        let records = self.lock();
        records.iter().rev().take(limit).cloned().collect()
    }

    fn most_searched(&self, limit: usize) -> Vec<String> {
        let records = self.lock();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records.iter() {
            *counts.entry(record.topic.as_str()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        // Sort by count descending; BTreeMap order already gives the
        // lexicographic tiebreak for equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(limit)
            .map(|(topic, _)| topic.to_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use trendlens_core::SourceId;

    use super::*;

    fn record(topic: &str) -> SearchRecord {
        SearchRecord {
            topic: topic.to_owned(),
            start: "2024-11-20".parse().unwrap(),
            end: "2024-11-22".parse().unwrap(),
            sources_used: BTreeSet::from([SourceId::NewsApi]),
            total_mentions: 1,
            searched_at: Utc::now(),
        }
    }

    #[test]
    fn recent_returns_newest_first() {
        let store = InMemoryHistoryStore::new(10);
        store.record(record("first")).unwrap();
        store.record(record("second")).unwrap();
        store.record(record("third")).unwrap();

        let recent = store.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].topic, "third");
        assert_eq!(recent[1].topic, "second");
    }

    #[test]
    fn capacity_drops_oldest() {
        let store = InMemoryHistoryStore::new(2);
        store.record(record("a")).unwrap();
        store.record(record("b")).unwrap();
        store.record(record("c")).unwrap();

        let recent = store.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].topic, "c");
        assert_eq!(recent[1].topic, "b");
    }

    #[test]
    fn most_searched_ranks_by_count_then_topic() {
        let store = InMemoryHistoryStore::new(10);
        for topic in ["rust", "bitcoin", "rust", "zig", "bitcoin", "rust"] {
            store.record(record(topic)).unwrap();
        }

        assert_eq!(store.most_searched(2), vec!["rust", "bitcoin"]);
        assert_eq!(store.most_searched(10), vec!["rust", "bitcoin", "zig"]);
    }

    #[test]
    fn ties_break_lexicographically() {
        let store = InMemoryHistoryStore::new(10);
        for topic in ["beta", "alpha"] {
            store.record(record(topic)).unwrap();
        }
        assert_eq!(store.most_searched(10), vec!["alpha", "beta"]);
    }
}
