//! Query orchestrator: resolves sources, fans out, tolerates failures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use trendlens_core::{AggregateResult, SourceId, TimeSeries};
use trendlens_sources::SourceClient;

use crate::aggregator;
use crate::EngineError;

/// Orchestrates one aggregation query across the registered sources.
///
/// The registry is a static mapping built once at construction; lookups at
/// query time either resolve or produce an explicit "unknown source" entry
/// in the result, never a panic or a hard failure.
pub struct TimeseriesService {
    registry: BTreeMap<SourceId, Arc<dyn SourceClient>>,
}

impl TimeseriesService {
    /// Builds the registry from the given adapters, keyed by their ids.
    #[must_use]
    pub fn new(clients: Vec<Arc<dyn SourceClient>>) -> Self {
        let registry = clients
            .into_iter()
            .map(|client| (client.source_id(), client))
            .collect();
        Self { registry }
    }

    /// Ids of all registered sources, in canonical order.
    pub fn registered(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.registry.keys().copied()
    }

    /// Runs one query: fetch from every requested source concurrently,
    /// merge whatever succeeded, account for whatever did not.
    ///
    /// `requested` of `None` (or an empty slice) means "all registered
    /// sources". Unknown or unregistered ids land in `sources_failed` with
    /// reason `"unknown source"`; a source that errors lands there with the
    /// error message. Even with every source failing the result is a valid
    /// all-zero skeleton over the range.
    ///
    /// # Errors
    ///
    /// Only caller-contract violations: [`EngineError::InvalidRange`] if
    /// `start > end`, [`EngineError::BlankTopic`] for an empty topic.
    pub async fn aggregate(
        &self,
        topic: &str,
        start: NaiveDate,
        end: NaiveDate,
        requested: Option<&[String]>,
    ) -> Result<AggregateResult, EngineError> {
        if topic.trim().is_empty() {
            return Err(EngineError::BlankTopic);
        }
        if start > end {
            return Err(EngineError::InvalidRange { start, end });
        }

        let mut sources_failed: BTreeMap<String, String> = BTreeMap::new();
        let resolved = self.resolve(requested, &mut sources_failed);

        let fetches = resolved.iter().map(|(id, client)| {
            let id = *id;
            let client = Arc::clone(client);
            async move { (id, client.fetch_daily(topic, start, end).await) }
        });

        let mut series: Vec<TimeSeries> = Vec::with_capacity(resolved.len());
        let mut sources_used: BTreeSet<SourceId> = BTreeSet::new();
        for (id, outcome) in join_all(fetches).await {
            match outcome {
                Ok(s) => {
                    tracing::debug!(source = %id, mentions = s.total(), "source returned data");
                    sources_used.insert(id);
                    series.push(s);
                }
                Err(e) => {
                    tracing::warn!(source = %id, error = %e, "source failed, continuing without it");
                    sources_failed.insert(id.to_string(), e.to_string());
                }
            }
        }

        let merged = aggregator::merge(&series, start, end);

        Ok(AggregateResult {
            topic: topic.to_owned(),
            start,
            end,
            total_mentions: merged.total_mentions,
            daily_stats: merged.daily_stats,
            per_source_totals: merged.per_source_totals,
            sources_used,
            sources_failed,
        })
    }

    /// Maps requested id strings to registered adapters, deduplicated in
    /// canonical order. Unknown ids are recorded, not fatal.
    fn resolve(
        &self,
        requested: Option<&[String]>,
        sources_failed: &mut BTreeMap<String, String>,
    ) -> Vec<(SourceId, Arc<dyn SourceClient>)> {
        match requested {
            None | Some([]) => self
                .registry
                .iter()
                .map(|(id, client)| (*id, Arc::clone(client)))
                .collect(),
            Some(ids) => {
                let mut resolved: BTreeMap<SourceId, Arc<dyn SourceClient>> = BTreeMap::new();
                for raw in ids {
                    let client = raw
                        .parse::<SourceId>()
                        .ok()
                        .and_then(|id| self.registry.get(&id).map(|c| (id, Arc::clone(c))));
                    match client {
                        Some((id, client)) => {
                            resolved.insert(id, client);
                        }
                        None => {
                            sources_failed.insert(raw.clone(), "unknown source".to_owned());
                        }
                    }
                }
                resolved.into_iter().collect()
            }
        }
    }
}
