//! Response generation with a primary and one fallback route per branch.
//!
//! | Branch | Primary | Fallback | Total failure |
//! |--------|---------|----------|---------------|
//! | direct | threaded chat, conversation persona, main model | stateless chat, direct persona, 150 tokens | [`DIRECT_APOLOGY`] |
//! | web_search | search-tool completion, search persona | search chat, 200 tokens | [`SEARCH_APOLOGY`] |
//!
//! Generation never returns an error; the caller learns from
//! [`GenerationSource`] whether the text is worth caching.

use std::sync::Arc;

use crate::config::ModelConfig;
use crate::llm::{CompletionRequest, LanguageModel};
use crate::prompts::PersonaPrompts;
use crate::types::{Message, QueryType};

pub const DIRECT_APOLOGY: &str =
    "Sorry, I'm having a little trouble thinking right now. Could you ask me that again?";
pub const SEARCH_APOLOGY: &str =
    "Sorry, I'm having trouble searching for that right now. Please try again in a moment.";

const DIRECT_FALLBACK_MAX_TOKENS: u32 = 150;
const DIRECT_FALLBACK_TEMPERATURE: f64 = 0.7;
const SEARCH_FALLBACK_MAX_TOKENS: u32 = 200;

/// Where a generated text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSource {
    Instant,
    Primary,
    Fallback,
    Apology,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub source: GenerationSource,
}

impl Generated {
    fn new(text: impl Into<String>, source: GenerationSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, GenerationSource::Fallback | GenerationSource::Apology)
    }

    /// Model output (primary or fallback) may be cached; canned text may not.
    pub fn is_cacheable(&self) -> bool {
        matches!(self.source, GenerationSource::Primary | GenerationSource::Fallback)
    }
}

pub struct ResponseGenerator {
    model: Arc<dyn LanguageModel>,
    models: ModelConfig,
    prompts: PersonaPrompts,
}

impl ResponseGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, models: ModelConfig, prompts: PersonaPrompts) -> Self {
        Self {
            model,
            models,
            prompts,
        }
    }

    /// Produce raw (unsanitized) text for `transcript`.
    ///
    /// `instant_reply` is only consulted for [`QueryType::Instant`].
    pub async fn generate(
        &self,
        transcript: &str,
        query_type: QueryType,
        instant_reply: Option<&str>,
        history: &[Message],
    ) -> Generated {
        match query_type {
            QueryType::Instant => match instant_reply {
                Some(reply) => Generated::new(reply, GenerationSource::Instant),
                None => self.direct(transcript, history).await,
            },
            QueryType::Direct => self.direct(transcript, history).await,
            QueryType::WebSearch => self.search(transcript).await,
        }
    }

    pub async fn direct(&self, transcript: &str, history: &[Message]) -> Generated {
        let primary = CompletionRequest::new(&self.models.main)
            .system(&self.prompts.conversation)
            .user(transcript);
        let err = match self.model.converse(&primary, history).await {
            Ok(text) => return Generated::new(text, GenerationSource::Primary),
            Err(e) => e,
        };
        tracing::warn!(error = %err, turns = history.len() / 2, "direct primary failed, trying fallback");

        let fallback = CompletionRequest::new(&self.models.main)
            .system(&self.prompts.direct)
            .user(transcript)
            .max_tokens(DIRECT_FALLBACK_MAX_TOKENS)
            .temperature(DIRECT_FALLBACK_TEMPERATURE);
        match self.model.complete(&fallback).await {
            Ok(text) => Generated::new(text, GenerationSource::Fallback),
            Err(e) => {
                tracing::error!(error = %e, "direct fallback failed, answering with apology");
                Generated::new(DIRECT_APOLOGY, GenerationSource::Apology)
            }
        }
    }

    pub async fn search(&self, query: &str) -> Generated {
        let primary = CompletionRequest::new(&self.models.search)
            .system(&self.prompts.search)
            .user(query);
        let err = match self.model.search_complete(&primary).await {
            Ok(text) => return Generated::new(text, GenerationSource::Primary),
            Err(e) => e,
        };
        tracing::warn!(error = %err, "search primary failed, trying fallback");

        let fallback = CompletionRequest::new(&self.models.search_fallback)
            .system(&self.prompts.search)
            .user(query)
            .max_tokens(SEARCH_FALLBACK_MAX_TOKENS);
        match self.model.search_chat(&fallback).await {
            Ok(text) => Generated::new(text, GenerationSource::Fallback),
            Err(e) => {
                tracing::error!(error = %e, "search fallback failed, answering with apology");
                Generated::new(SEARCH_APOLOGY, GenerationSource::Apology)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call; fails the routes named in `fail`.
    #[derive(Default)]
    struct Recorder {
        fail: Vec<&'static str>,
        calls: Mutex<Vec<(&'static str, CompletionRequest)>>,
    }

    impl Recorder {
        fn failing(fail: &[&'static str]) -> Self {
            Self {
                fail: fail.to_vec(),
                ..Default::default()
            }
        }

        fn answer(&self, route: &'static str, req: &CompletionRequest) -> Result<String> {
            self.calls.lock().unwrap().push((route, req.clone()));
            if self.fail.contains(&route) {
                Err(Error::runtime(format!("{route} down")))
            } else {
                Ok(format!("{route} answer."))
            }
        }
    }

    #[async_trait]
    impl LanguageModel for Recorder {
        fn provider_id(&self) -> &str {
            "recorder"
        }
        async fn complete(&self, req: &CompletionRequest) -> Result<String> {
            self.answer("complete", req)
        }
        async fn search_complete(&self, req: &CompletionRequest) -> Result<String> {
            self.answer("search_complete", req)
        }
        async fn search_chat(&self, req: &CompletionRequest) -> Result<String> {
            self.answer("search_chat", req)
        }
        async fn converse(&self, req: &CompletionRequest, history: &[Message]) -> Result<String> {
            let threaded = req.clone().messages(
                history.iter().cloned().chain(req.messages.iter().cloned()).collect(),
            );
            self.answer("converse", &threaded)
        }
    }

    fn generator(model: Arc<Recorder>) -> ResponseGenerator {
        ResponseGenerator::new(model, ModelConfig::default(), PersonaPrompts::default())
    }

    #[tokio::test]
    async fn direct_primary_threads_history() {
        let model = Arc::new(Recorder::default());
        let history = vec![Message::user("my name is Sam"), Message::assistant("Hi Sam!")];
        let out = generator(model.clone())
            .generate("what's my name", QueryType::Direct, None, &history)
            .await;
        assert_eq!(out.source, GenerationSource::Primary);
        assert!(out.is_cacheable());

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.messages.len(), 3);
        assert_eq!(calls[0].1.model, "gpt-4.1-mini");
    }

    #[tokio::test]
    async fn direct_fallback_is_bounded() {
        let model = Arc::new(Recorder::failing(&["converse"]));
        let out = generator(model.clone()).direct("explain tides", &[]).await;
        assert_eq!(out.source, GenerationSource::Fallback);
        assert_eq!(out.text, "complete answer.");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1.max_tokens, Some(150));
        assert_eq!(calls[1].1.temperature, Some(0.7));
    }

    #[tokio::test]
    async fn total_failure_yields_uncacheable_apology() {
        let model = Arc::new(Recorder::failing(&["converse", "complete", "search_complete", "search_chat"]));
        let relay = generator(model.clone());

        let direct = relay.direct("explain tides", &[]).await;
        assert_eq!(direct.text, DIRECT_APOLOGY);
        assert!(!direct.is_cacheable());

        let search = relay.search("weather today").await;
        assert_eq!(search.text, SEARCH_APOLOGY);
        assert!(search.is_fallback());

        assert_eq!(model.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn search_fallback_uses_fallback_model() {
        let model = Arc::new(Recorder::failing(&["search_complete"]));
        let out = generator(model.clone()).search("news today").await;
        assert_eq!(out.source, GenerationSource::Fallback);

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].1.model, "gpt-4.1");
        assert_eq!(calls[1].1.model, "gpt-4o-search-preview");
        assert_eq!(calls[1].1.max_tokens, Some(200));
    }

    #[tokio::test]
    async fn instant_reply_skips_the_model() {
        let model = Arc::new(Recorder::default());
        let out = generator(model.clone())
            .generate("hello", QueryType::Instant, Some("Hi there!"), &[])
            .await;
        assert_eq!(out, Generated::new("Hi there!", GenerationSource::Instant));
        assert!(!out.is_cacheable());
        assert!(model.calls.lock().unwrap().is_empty());
    }
}
