//! 模型能力层：以统一 trait 封装普通补全、联网搜索补全与多轮对话。
//!
//! # Language Model Capabilities
//!
//! The generator and classifier only need three things from a model:
//!
//! | Capability | Method | Used by |
//! |------------|--------|---------|
//! | Plain completion | [`LanguageModel::complete`] | classifier, direct fallback |
//! | Search-tool completion | [`LanguageModel::search_complete`] | web search primary |
//! | Search-augmented chat | [`LanguageModel::search_chat`] | web search fallback |
//! | Threaded conversation | [`LanguageModel::converse`] | direct primary |
//!
//! Concrete adapters live in [`openai`] and [`gemini`]; tests substitute their
//! own implementations.

pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProviderKind, RelayConfig};
use crate::transport::resolve_api_key;
use crate::types::Message;
use crate::Result;

pub use gemini::GeminiModel;
pub use openai::OpenAiModel;

/// Provider-neutral completion parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn system(mut self, prompt: impl Into<String>) -> Self {
        self.system = Some(prompt.into());
        self
    }

    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::user(text));
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.temperature = Some(t);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider identifier, e.g. "openai".
    fn provider_id(&self) -> &str;

    async fn complete(&self, req: &CompletionRequest) -> Result<String>;

    /// Completion with the provider's web-search / grounding tool enabled.
    async fn search_complete(&self, req: &CompletionRequest) -> Result<String>;

    /// A second route to search results, tried when `search_complete` fails.
    async fn search_chat(&self, req: &CompletionRequest) -> Result<String>;

    /// Multi-turn completion: `history` is inserted ahead of the request's own messages.
    async fn converse(&self, req: &CompletionRequest, history: &[Message]) -> Result<String> {
        let mut messages = history.to_vec();
        messages.extend(req.messages.iter().cloned());
        let threaded = req.clone().messages(messages);
        self.complete(&threaded).await
    }
}

/// Build the configured provider adapter.
pub fn from_config(config: &RelayConfig) -> Result<Arc<dyn LanguageModel>> {
    let kind = config.provider.kind;
    let api_key = resolve_api_key(kind.id(), config.provider.api_key.as_deref())?;
    let timeout = Duration::from_secs(config.provider.timeout_secs);

    let model: Arc<dyn LanguageModel> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiModel::new(
            &config.provider.openai_base_url,
            api_key,
            timeout,
        )?),
        ProviderKind::Gemini => Arc::new(GeminiModel::new(
            &config.provider.gemini_base_url,
            api_key,
            timeout,
        )?),
    };
    tracing::info!(provider = kind.id(), "language model adapter ready");
    Ok(model)
}
