//! Ad-hoc mention queries from the command line.
//!
//! Builds the full stack (config → adapters → registry → search service)
//! and runs a single aggregation, printing the daily table and per-source
//! totals. Sources that fail are reported, not fatal.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trendlens_core::{load_config, AppConfig};
use trendlens_engine::{InMemoryHistoryStore, SearchService, TimeseriesService};
use trendlens_sources::{NewsApiClient, RedditAuth, RedditClient, SourceClient, WikipediaClient};

#[derive(Debug, Parser)]
#[command(name = "trendlens")]
#[command(about = "Daily mention counts for a topic across news, Reddit, and Wikipedia")]
struct Cli {
    /// Topic to search for.
    topic: String,

    /// First day of the range (inclusive). Defaults to a week before the end.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the range (inclusive). Defaults to today (UTC).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Sources to query (newsapi, reddit, wikipedia). Defaults to all
    /// registered sources.
    #[arg(long, value_delimiter = ',')]
    sources: Vec<String>,
}

fn build_registry(config: &AppConfig) -> anyhow::Result<Vec<Arc<dyn SourceClient>>> {
    let mut clients: Vec<Arc<dyn SourceClient>> = vec![
        Arc::new(NewsApiClient::new(
            &config.newsapi_api_key,
            &config.newsapi_language,
            config.request_timeout_secs,
        )?),
        Arc::new(WikipediaClient::new(
            &config.wikipedia_project,
            &config.wikipedia_access,
            &config.wikipedia_agent,
            &config.http_user_agent,
            config.request_timeout_secs,
        )?),
    ];

    if let Some(reddit) = &config.reddit {
        let auth = Arc::new(RedditAuth::new(
            &reddit.client_id,
            &reddit.client_secret,
            &reddit.user_agent,
            config.request_timeout_secs,
        )?);
        clients.push(Arc::new(RedditClient::new(
            auth,
            config.request_timeout_secs,
        )?));
    } else {
        tracing::info!("Reddit credentials not set, source disabled");
    }

    Ok(clients)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    let end = cli.end.unwrap_or_else(|| Utc::now().date_naive());
    let start = cli.start.unwrap_or_else(|| end - chrono::Duration::days(7));

    let service = SearchService::new(
        TimeseriesService::new(build_registry(&config)?),
        Arc::new(InMemoryHistoryStore::new(config.history_limit)),
        Duration::from_secs(config.cache_ttl_secs),
        config.cache_capacity,
    );

    let requested = (!cli.sources.is_empty()).then_some(cli.sources.as_slice());
    let outcome = service.search(&cli.topic, start, end, requested).await?;
    let result = outcome.result;

    println!(
        "{} — {} to {} — {} mentions",
        result.topic, result.start, result.end, result.total_mentions
    );
    for stat in &result.daily_stats {
        println!("  {}  {}", stat.date, stat.mentions);
    }

    if !result.per_source_totals.is_empty() {
        println!("by source:");
        for (source, total) in &result.per_source_totals {
            println!("  {source}  {total}");
        }
    }

    for (source, reason) in &result.sources_failed {
        eprintln!("warning: {source} unavailable: {reason}");
    }

    Ok(())
}
