//! Gemini generateContent 适配器
//!
//! Google Gemini adapter. Differences from OpenAI:
//! - Uses `contents` with `parts` instead of `messages`; roles are `user` / `model`.
//! - System prompt goes in the top-level `system_instruction`.
//! - `generationConfig` carries temperature and `maxOutputTokens`.
//! - Search is grounding via the `google_search` tool; there is no separate
//!   search model, so `search_chat` is the same call on the fallback model.
//! - API key is passed as `?key=`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{CompletionRequest, LanguageModel};
use crate::transport::{AuthStyle, HttpTransport};
use crate::types::MessageRole;
use crate::{Error, Result};

pub struct GeminiModel {
    transport: HttpTransport,
}

impl GeminiModel {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new("gemini", base_url, api_key, AuthStyle::QueryKey, timeout)?,
        })
    }

    fn path(model: &str) -> String {
        format!("/v1beta/models/{}:generateContent", model)
    }

    pub(crate) fn build_body(req: &CompletionRequest, grounded: bool) -> Value {
        let contents: Vec<Value> = req
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| {
                let role = match m.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        let mut body = json!({ "contents": contents });

        let system: Vec<&str> = req
            .system
            .as_deref()
            .into_iter()
            .chain(
                req.messages
                    .iter()
                    .filter(|m| m.role == MessageRole::System)
                    .map(|m| m.content.as_str()),
            )
            .collect();
        if !system.is_empty() {
            body["system_instruction"] = json!({ "parts": [{ "text": system.join("\n\n") }] });
        }

        let mut gen_config = json!({});
        if let Some(t) = req.temperature {
            gen_config["temperature"] = json!(t);
        }
        if let Some(n) = req.max_tokens {
            gen_config["maxOutputTokens"] = json!(n);
        }
        if gen_config != json!({}) {
            body["generationConfig"] = gen_config;
        }

        if grounded {
            body["tools"] = json!([{ "google_search": {} }]);
        }
        body
    }

    /// Concatenate all text parts of the first candidate.
    pub(crate) fn parse_text(body: &Value) -> Option<String> {
        let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    async fn generate(&self, req: &CompletionRequest, grounded: bool, source: &str) -> Result<String> {
        let body = self
            .transport
            .post_json(&Self::path(&req.model), &Self::build_body(req, grounded))
            .await?;
        Self::parse_text(&body).ok_or_else(|| Error::empty_response(source.to_string()))
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn provider_id(&self) -> &str {
        self.transport.provider_id()
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        self.generate(req, false, "gemini.generate").await
    }

    async fn search_complete(&self, req: &CompletionRequest) -> Result<String> {
        self.generate(req, true, "gemini.grounded").await
    }

    async fn search_chat(&self, req: &CompletionRequest) -> Result<String> {
        self.generate(req, true, "gemini.grounded_fallback").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn system_prompt_becomes_system_instruction() {
        let req = CompletionRequest::new("gemini-2.0-flash")
            .system("Be concise.")
            .user("Explain Rust.");
        let body = GeminiModel::build_body(&req, false);
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "Be concise.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn assistant_role_maps_to_model() {
        let req = CompletionRequest::new("gemini-2.0-flash").messages(vec![
            Message::user("Hi"),
            Message::assistant("Hello!"),
            Message::user("How are you?"),
        ]);
        let body = GeminiModel::build_body(&req, false);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["role"], "user");
    }

    #[test]
    fn grounded_requests_carry_google_search() {
        let req = CompletionRequest::new("gemini-2.0-flash")
            .user("weather today")
            .temperature(0.5)
            .max_tokens(200);
        let body = GeminiModel::build_body(&req, true);
        assert!(body["tools"][0].get("google_search").is_some());
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 200);
    }

    #[test]
    fn text_parts_are_joined() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{"text": "It's "}, {"text": "sunny."}], "role": "model" },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(GeminiModel::parse_text(&body).as_deref(), Some("It's sunny."));
        assert!(GeminiModel::parse_text(&json!({"candidates": []})).is_none());
    }
}
