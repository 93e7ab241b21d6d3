use reqwest::StatusCode;
use thiserror::Error;
use trendlens_core::SourceId;

/// Longest response-body excerpt carried inside an error message.
const BODY_EXCERPT_LEN: usize = 200;

/// Errors returned by the source adapters.
///
/// Every variant names the source it came from so the engine can record the
/// failure against the right id without inspecting the message.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("{source_id}: http error: {cause}")]
    Http {
        source_id: SourceId,
        #[source]
        cause: reqwest::Error,
    },

    /// The upstream API answered with an unexpected HTTP status.
    #[error("{source_id}: HTTP {status}: {body}")]
    Status {
        source_id: SourceId,
        status: StatusCode,
        /// Truncated response body, for diagnostics only.
        body: String,
    },

    /// The upstream API answered 2xx but its envelope signals an error.
    #[error("{source_id}: api error {code}: {message}")]
    Api {
        source_id: SourceId,
        code: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected shape.
    #[error("{source_id}: malformed response for {context}: {cause}")]
    Deserialize {
        source_id: SourceId,
        context: String,
        #[source]
        cause: serde_json::Error,
    },

    /// The OAuth token exchange failed; no usable bearer token.
    #[error("{source_id}: token exchange failed: {message}")]
    TokenExchange { source_id: SourceId, message: String },
}

impl SourceError {
    /// The source this error belongs to.
    #[must_use]
    pub fn source_id(&self) -> SourceId {
        match self {
            SourceError::Http { source_id, .. }
            | SourceError::Status { source_id, .. }
            | SourceError::Api { source_id, .. }
            | SourceError::Deserialize { source_id, .. }
            | SourceError::TokenExchange { source_id, .. } => *source_id,
        }
    }

    pub(crate) fn http(source_id: SourceId, cause: reqwest::Error) -> Self {
        SourceError::Http { source_id, cause }
    }

    pub(crate) fn status(source_id: SourceId, status: StatusCode, body: &str) -> Self {
        SourceError::Status {
            source_id,
            status,
            body: excerpt(body),
        }
    }

    pub(crate) fn deserialize(
        source_id: SourceId,
        context: impl Into<String>,
        cause: serde_json::Error,
    ) -> Self {
        SourceError::Deserialize {
            source_id,
            context: context.into(),
            cause,
        }
    }
}

/// Truncates a response body to a loggable excerpt, respecting char boundaries.
pub(crate) fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LEN {
        return body.to_owned();
    }
    let mut cut = BODY_EXCERPT_LEN;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &body[..cut])
}
