//! Request and response bodies of the HTTP surface.
//!
//! Inputs accept the camelCase names the browser frontend sends (`sessionId`)
//! as aliases; outputs are snake_case.

use serde::{Deserialize, Serialize};

use super::query::ResponseKind;

pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessQueryRequest {
    #[serde(default)]
    pub transcript: String,
    #[serde(default, alias = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ProcessQueryRequest {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// The session id to key conversation memory with, `"default"` when absent or blank.
    pub fn session_or_default(&self) -> String {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessQueryResponse {
    pub response: String,
    pub query_type: ResponseKind,
    pub processing_time_ms: u64,
    pub session_id: String,
    pub cached: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResponse {
    pub success: bool,
    pub query: String,
    pub summary: String,
    pub has_search_results: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearSessionRequest {
    #[serde(default, alias = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearSessionResponse {
    pub success: bool,
    pub session_id: String,
    /// Whether the session actually had conversation memory to drop.
    pub cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthModels {
    pub classifier: String,
    pub main: String,
    pub search: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub provider: String,
    pub models: HealthModels,
    pub cache_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptCheckResponse {
    pub interrupt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_camel_case_session_id() {
        let req: ProcessQueryRequest =
            serde_json::from_str(r#"{"transcript":"hi","sessionId":"s-1"}"#).unwrap();
        assert_eq!(req.session_or_default(), "s-1");
    }

    #[test]
    fn blank_session_falls_back_to_default() {
        let req = ProcessQueryRequest::new("hi").with_session("   ");
        assert_eq!(req.session_or_default(), DEFAULT_SESSION_ID);
        let req: ProcessQueryRequest = serde_json::from_str(r#"{"transcript":"hi"}"#).unwrap();
        assert_eq!(req.session_or_default(), DEFAULT_SESSION_ID);
    }
}
