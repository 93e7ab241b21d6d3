//! OAuth token cache for the Reddit Data API (client-credentials flow).
//!
//! Holds at most one bearer token for the lifetime of the process, refreshed
//! lazily when it nears expiry. The cell is a single owned `RwLock`; callers
//! share the cache via `Arc`, there is no ambient global state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use trendlens_core::SourceId;

use crate::error::{excerpt, SourceError};

const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
/// Refresh this many seconds before the server-declared expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;
/// Never cache a token for less than this, even if the margin eats the TTL.
const MIN_TTL_SECS: i64 = 30;

const SOURCE_ID: SourceId = SourceId::Reddit;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct AuthToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Cached Reddit OAuth token, safe to share across concurrent queries.
pub struct RedditAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    token_url: String,
    token: RwLock<Option<AuthToken>>,
}

impl RedditAuth {
    /// Creates a token cache pointed at the production Reddit token endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, SourceError> {
        Self::with_token_url(
            client_id,
            client_secret,
            user_agent,
            timeout_secs,
            DEFAULT_TOKEN_URL,
        )
    }

    /// Creates a token cache with a custom token endpoint (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_token_url(
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
        timeout_secs: u64,
        token_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        Ok(Self {
            client,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            user_agent: user_agent.to_owned(),
            token_url: token_url.to_owned(),
            token: RwLock::new(None),
        })
    }

    /// The `User-Agent` the search client must send alongside the token.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns a valid bearer token, refreshing it if stale.
    ///
    /// Fast path is a shared read lock: a fresh cached token is cloned out
    /// with no exclusive section. On expiry, the first caller takes the
    /// write lock and performs the exchange; concurrent callers block on
    /// the same lock, re-check freshness, and observe the new token without
    /// issuing duplicate refresh calls.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TokenExchange`] or [`SourceError::Http`] if
    /// the refresh fails. A previous token survives only while it is still
    /// clock-valid.
    pub async fn token(&self) -> Result<String, SourceError> {
        {
            let guard = self.token.read().await;
            if let Some(token) = guard.as_ref() {
                if token.is_fresh(Utc::now()) {
                    return Ok(token.value.clone());
                }
            }
        }

        let mut guard = self.token.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn exchange(&self) -> Result<AuthToken, SourceError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("User-Agent", &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::http(SOURCE_ID, e))?;

        if !status.is_success() {
            return Err(SourceError::TokenExchange {
                source_id: SOURCE_ID,
                message: format!("HTTP {status}: {}", excerpt(&body)),
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::deserialize(SOURCE_ID, "access_token", e))?;

        let ttl_secs = (parsed.expires_in - EXPIRY_MARGIN_SECS).max(MIN_TTL_SECS);
        tracing::debug!(ttl_secs, "obtained Reddit access token");

        Ok(AuthToken {
            value: parsed.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(ttl_secs),
        })
    }
}
