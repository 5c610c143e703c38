//! Query classification types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a transcript is answered. Exactly one per query; also selects the cache TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Canned reply from the instant-response table, no model call.
    Instant,
    /// Answerable from general knowledge by a conversational model.
    Direct,
    /// Needs live information, answered by a search-augmented model.
    WebSearch,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Instant => "instant",
            QueryType::Direct => "direct",
            QueryType::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `query_type` reported at the HTTP boundary: a [`QueryType`] or `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Instant,
    Direct,
    WebSearch,
    Error,
}

impl From<QueryType> for ResponseKind {
    fn from(t: QueryType) -> Self {
        match t {
            QueryType::Instant => ResponseKind::Instant,
            QueryType::Direct => ResponseKind::Direct,
            QueryType::WebSearch => ResponseKind::WebSearch,
        }
    }
}

/// Outcome of classifying one transcript. `instant_response` is set iff the type is `Instant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub query_type: QueryType,
    pub instant_response: Option<String>,
}

impl ClassificationResult {
    pub fn instant(reply: impl Into<String>) -> Self {
        Self {
            query_type: QueryType::Instant,
            instant_response: Some(reply.into()),
        }
    }

    pub fn of(query_type: QueryType) -> Self {
        Self {
            query_type,
            instant_response: None,
        }
    }
}
