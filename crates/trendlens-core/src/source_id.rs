use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier for one of the registered external data sources.
///
/// The engine resolves sources by this tagged variant, built once at process
/// start, rather than by free-form string keys. Unknown strings surface as a
/// [`ParseSourceIdError`] so the caller can report "unknown source" instead
/// of silently dropping the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// NewsAPI `/v2/everything` article search.
    NewsApi,
    /// Reddit post search via the OAuth Data API.
    Reddit,
    /// Wikimedia per-article pageview counts.
    Wikipedia,
}

impl SourceId {
    /// All known sources, in the canonical (sorted) order.
    pub const ALL: [SourceId; 3] = [SourceId::NewsApi, SourceId::Reddit, SourceId::Wikipedia];

    /// The wire/string form of the identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceId::NewsApi => "newsapi",
            SourceId::Reddit => "reddit",
            SourceId::Wikipedia => "wikipedia",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown source: {0}")]
pub struct ParseSourceIdError(pub String);

impl FromStr for SourceId {
    type Err = ParseSourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newsapi" => Ok(SourceId::NewsApi),
            "reddit" => Ok(SourceId::Reddit),
            "wikipedia" => Ok(SourceId::Wikipedia),
            other => Err(ParseSourceIdError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        for id in SourceId::ALL {
            assert_eq!(id.as_str().parse::<SourceId>().unwrap(), id);
        }
    }

    #[test]
    fn unknown_source_is_an_explicit_error() {
        let err = "twitter".parse::<SourceId>().unwrap_err();
        assert_eq!(err, ParseSourceIdError("twitter".to_owned()));
        assert_eq!(err.to_string(), "unknown source: twitter");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&SourceId::NewsApi).unwrap();
        assert_eq!(json, "\"newsapi\"");
        let back: SourceId = serde_json::from_str("\"wikipedia\"").unwrap();
        assert_eq!(back, SourceId::Wikipedia);
    }
}
