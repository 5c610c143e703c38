//! OpenAI adapter.
//!
//! - `complete` / `converse`: Chat Completions (`/v1/chat/completions`).
//! - `search_complete`: Responses API (`/v1/responses`) with the `web_search` tool;
//!   text is the first `output_text` part of a `message` output item, or the
//!   top-level `output_text` convenience field.
//! - `search_chat`: Chat Completions against a `*-search-preview` model with
//!   `web_search_options`. These models reject `temperature`, so it is omitted.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{CompletionRequest, LanguageModel};
use crate::transport::{AuthStyle, HttpTransport};
use crate::types::Message;
use crate::{Error, Result};

const CHAT_PATH: &str = "/v1/chat/completions";
const RESPONSES_PATH: &str = "/v1/responses";

pub struct OpenAiModel {
    transport: HttpTransport,
}

impl OpenAiModel {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new("openai", base_url, api_key, AuthStyle::Bearer, timeout)?,
        })
    }

    fn chat_messages(req: &CompletionRequest) -> Vec<Value> {
        let mut out = Vec::with_capacity(req.messages.len() + 1);
        if let Some(system) = &req.system {
            out.push(json!({ "role": "system", "content": system }));
        }
        out.extend(req.messages.iter().map(message_json));
        out
    }

    pub(crate) fn build_chat_body(req: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": req.model,
            "messages": Self::chat_messages(req),
        });
        if let Some(t) = req.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(n) = req.max_tokens {
            body["max_tokens"] = json!(n);
        }
        body
    }

    pub(crate) fn build_responses_body(req: &CompletionRequest) -> Value {
        let input: Vec<Value> = req.messages.iter().map(message_json).collect();
        let mut body = json!({
            "model": req.model,
            "tools": [{ "type": "web_search" }],
            "input": input,
        });
        if let Some(system) = &req.system {
            body["instructions"] = json!(system);
        }
        if let Some(n) = req.max_tokens {
            body["max_output_tokens"] = json!(n);
        }
        body
    }

    pub(crate) fn build_search_chat_body(req: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": req.model,
            "web_search_options": { "search_context_size": "medium" },
            "messages": Self::chat_messages(req),
        });
        if let Some(n) = req.max_tokens {
            body["max_tokens"] = json!(n);
        }
        body
    }

    pub(crate) fn parse_chat_text(body: &Value) -> Option<String> {
        body.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    pub(crate) fn parse_responses_text(body: &Value) -> Option<String> {
        let from_output = body
            .get("output")
            .and_then(|o| o.as_array())
            .and_then(|items| {
                items
                    .iter()
                    .filter(|item| item["type"] == "message")
                    .filter_map(|item| item["content"].as_array())
                    .flatten()
                    .find(|part| part["type"] == "output_text")
                    .and_then(|part| part["text"].as_str())
            });

        from_output
            .or_else(|| body.get("output_text").and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }
}

fn message_json(m: &Message) -> Value {
    json!({ "role": m.role.as_str(), "content": m.content })
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn provider_id(&self) -> &str {
        self.transport.provider_id()
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        let body = self
            .transport
            .post_json(CHAT_PATH, &Self::build_chat_body(req))
            .await?;
        Self::parse_chat_text(&body).ok_or_else(|| Error::empty_response("openai.chat"))
    }

    async fn search_complete(&self, req: &CompletionRequest) -> Result<String> {
        let body = self
            .transport
            .post_json(RESPONSES_PATH, &Self::build_responses_body(req))
            .await?;
        Self::parse_responses_text(&body).ok_or_else(|| Error::empty_response("openai.responses"))
    }

    async fn search_chat(&self, req: &CompletionRequest) -> Result<String> {
        let body = self
            .transport
            .post_json(CHAT_PATH, &Self::build_search_chat_body(req))
            .await?;
        Self::parse_chat_text(&body).ok_or_else(|| Error::empty_response("openai.search_chat"))
    }
}
