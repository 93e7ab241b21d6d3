//! Shared data model and configuration for trendlens.
//!
//! Everything that flows between the source adapters and the aggregation
//! engine lives here: daily time series, source identifiers, aggregate
//! results, and the env-var based application configuration.

use thiserror::Error;

mod app_config;
mod config;
mod model;
mod source_id;

pub use app_config::AppConfig;
pub use config::{load_config, load_config_from_env};
pub use model::{
    day_count, days_inclusive, AggregateResult, DailyStat, Granularity, SearchRecord, TimeBucket,
    TimeSeries,
};
pub use source_id::{ParseSourceIdError, SourceId};

/// Errors produced while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but its value cannot be parsed.
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
