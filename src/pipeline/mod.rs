//! 查询流水线：即时回复 → 缓存 → 分类 → 生成 → 语音清理 → 写缓存。
//!
//! # Query Pipeline
//!
//! [`QueryPipeline`] is the single place where the per-query steps run, in a
//! fixed order:
//!
//! ```text
//! transcript ─▶ instant table ─hit─▶ canned reply
//!      │
//!      ▼
//!   cache ─hit─▶ cached reply (cached: true)
//!      │
//!      ▼
//!  classify (fast patterns, then model)
//!      │
//!      ▼
//!  generate (primary, fallback, apology)
//!      │
//!      ▼
//!  sanitize + truncate ─▶ cache write (context-free model text) ─▶ response
//! ```
//!
//! Valid input always yields a response; only an empty transcript is an error.
//! The cache and conversation store are shared services and can be injected,
//! which is how tests control time and inspect state.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::cache::{CacheConfig, ResponseCache};
use crate::classify::QueryClassifier;
use crate::config::{ModelConfig, RelayConfig};
use crate::conversation::ConversationStore;
use crate::generate::{
    GenerationSource, Generated, ResponseGenerator, DIRECT_APOLOGY, SEARCH_APOLOGY,
};
use crate::llm::{self, LanguageModel};
use crate::prompts::PersonaPrompts;
use crate::types::{
    ClearSessionRequest, ClearSessionResponse, HealthModels, HealthResponse, ProcessQueryRequest,
    ProcessQueryResponse, QueryType, ResponseKind, WebSearchRequest, WebSearchResponse,
};
use crate::voice::prepare_for_voice;
use crate::{Error, ErrorContext, Result};

pub struct QueryPipeline {
    classifier: QueryClassifier,
    generator: ResponseGenerator,
    cache: Arc<ResponseCache>,
    conversations: Arc<ConversationStore>,
    provider: String,
    models: ModelConfig,
    max_sentences: usize,
}

impl QueryPipeline {
    pub fn builder(model: Arc<dyn LanguageModel>) -> QueryPipelineBuilder {
        QueryPipelineBuilder::new(model)
    }

    /// Build the provider adapter from `config` and wire everything to it.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let model = llm::from_config(config)?;
        Ok(Self::builder(model).config(config).build())
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn conversations(&self) -> &Arc<ConversationStore> {
        &self.conversations
    }

    pub async fn process_query(&self, req: &ProcessQueryRequest) -> Result<ProcessQueryResponse> {
        let started = Instant::now();
        let transcript = require_text(&req.transcript, "transcript")?;
        let session_id = req.session_or_default();
        let request_id = Uuid::new_v4();

        if let Some(classification) = self.classifier.instant(transcript) {
            let reply = classification.instant_response.unwrap_or_default();
            self.conversations.append(&session_id, transcript, &reply);
            tracing::info!(%request_id, %session_id, query_type = "instant", "instant reply");
            return Ok(respond(reply, ResponseKind::Instant, started, session_id, false));
        }

        if let Some(entry) = self.cache.get(transcript) {
            self.conversations.append(&session_id, transcript, &entry.response);
            tracing::info!(
                %request_id,
                %session_id,
                query_type = %entry.query_type,
                "served from cache"
            );
            return Ok(respond(
                entry.response,
                entry.query_type.into(),
                started,
                session_id,
                true,
            ));
        }

        let query_type = self.classifier.classify_query(transcript).await;
        let history = self.conversations.history(&session_id);
        let generated = self
            .generator
            .generate(transcript, query_type, None, &history)
            .await;
        let (text, cacheable) = self.finish(&generated, query_type);

        // Canned apologies are neither cached nor remembered as part of the conversation.
        // A direct answer shaped by earlier turns only makes sense inside that session,
        // so the shared cache keeps context-free answers only.
        if cacheable {
            if query_type == QueryType::WebSearch || history.is_empty() {
                self.cache.set(transcript, text.clone(), query_type);
            }
            self.conversations.append(&session_id, transcript, &text);
        }

        tracing::info!(
            %request_id,
            %session_id,
            query_type = %query_type,
            source = ?generated.source,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query answered"
        );
        Ok(respond(text, query_type.into(), started, session_id, false))
    }

    /// The search branch on its own, without classification or caching.
    pub async fn web_search(&self, req: &WebSearchRequest) -> Result<WebSearchResponse> {
        let query = require_text(&req.query, "query")?;
        let generated = self.generator.search(query).await;
        let (summary, _) = self.finish(&generated, QueryType::WebSearch);
        let success = generated.source != GenerationSource::Apology;
        tracing::info!(source = ?generated.source, success, "web search answered");
        Ok(WebSearchResponse {
            success,
            query: query.to_string(),
            has_search_results: success && !summary.is_empty(),
            summary,
        })
    }

    /// Drop a session's conversation memory. The response cache is shared and left alone.
    pub fn clear_session(&self, req: &ClearSessionRequest) -> Result<ClearSessionResponse> {
        let session_id = require_text(&req.session_id, "session_id")?;
        let cleared = self.conversations.clear(session_id);
        tracing::info!(%session_id, cleared, "session cleared");
        Ok(ClearSessionResponse {
            success: true,
            session_id: session_id.to_string(),
            cleared,
        })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            message: "Avatar voice relay is running".to_string(),
            provider: self.provider.clone(),
            models: HealthModels {
                classifier: self.models.classifier.clone(),
                main: self.models.main.clone(),
                search: self.models.search.clone(),
            },
            cache_entries: self.cache.len(),
        }
    }

    /// Voice-ready text plus whether it may be cached.
    fn finish(&self, generated: &Generated, query_type: QueryType) -> (String, bool) {
        let text = prepare_for_voice(&generated.text, self.max_sentences);
        if text.is_empty() {
            tracing::warn!(query_type = %query_type, "nothing speakable left after sanitizing");
            return (apology_for(query_type).to_string(), false);
        }
        (text, generated.is_cacheable())
    }
}

pub struct QueryPipelineBuilder {
    model: Arc<dyn LanguageModel>,
    models: ModelConfig,
    prompts: PersonaPrompts,
    cache_config: CacheConfig,
    cache: Option<Arc<ResponseCache>>,
    conversations: Option<Arc<ConversationStore>>,
    max_sentences: usize,
}

impl QueryPipelineBuilder {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        let defaults = RelayConfig::default();
        Self {
            model,
            models: defaults.models,
            prompts: PersonaPrompts::default(),
            cache_config: CacheConfig::default(),
            cache: None,
            conversations: None,
            max_sentences: defaults.voice.max_sentences,
        }
    }

    /// Take models, prompts, TTLs, limits and session bounds from `config`.
    pub fn config(mut self, config: &RelayConfig) -> Self {
        self.models = config.models.clone();
        self.prompts = PersonaPrompts::for_avatar(&config.voice.avatar_name);
        self.cache_config = CacheConfig::from(&config.cache);
        self.max_sentences = config.voice.max_sentences;
        if self.conversations.is_none() {
            self.conversations = Some(Arc::new(ConversationStore::from_config(&config.conversation)));
        }
        self
    }

    pub fn models(mut self, models: ModelConfig) -> Self {
        self.models = models;
        self
    }

    pub fn cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn conversations(mut self, store: Arc<ConversationStore>) -> Self {
        self.conversations = Some(store);
        self
    }

    pub fn max_sentences(mut self, n: usize) -> Self {
        self.max_sentences = n.max(1);
        self
    }

    pub fn build(self) -> QueryPipeline {
        let provider = self.model.provider_id().to_string();
        QueryPipeline {
            classifier: QueryClassifier::new(self.model.clone(), self.models.classifier.clone()),
            generator: ResponseGenerator::new(self.model, self.models.clone(), self.prompts),
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(ResponseCache::new(self.cache_config))),
            conversations: self.conversations.unwrap_or_default(),
            provider,
            models: self.models,
            max_sentences: self.max_sentences,
        }
    }
}

fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_with_context(
            format!("{} is required", field),
            ErrorContext::new().with_field_path(field).with_source("pipeline"),
        ));
    }
    Ok(trimmed)
}

fn apology_for(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::WebSearch => SEARCH_APOLOGY,
        QueryType::Direct | QueryType::Instant => DIRECT_APOLOGY,
    }
}

fn respond(
    response: String,
    query_type: ResponseKind,
    started: Instant,
    session_id: String,
    cached: bool,
) -> ProcessQueryResponse {
    ProcessQueryResponse {
        response,
        query_type,
        processing_time_ms: started.elapsed().as_millis() as u64,
        session_id,
        cached,
    }
}
