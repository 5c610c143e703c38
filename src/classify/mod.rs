//! 查询分类：即时回复表、正则快速路径、模型兜底。
//!
//! # Query Classification
//!
//! Every transcript is routed to one of three paths:
//!
//! | Stage | Function | Cost |
//! |-------|----------|------|
//! | Instant table | [`instant::lookup_instant`] | hash lookup |
//! | Fast patterns | [`fast::classify_fast`] | a few regexes |
//! | Model | [`llm::classify_llm`] | one short completion |
//!
//! The pipeline consults the instant table first (before the cache) and only
//! calls [`QueryClassifier::classify_query`] when no canned reply exists.
//!
//! ```
//! use avatar_voice_relay::classify::{classify_fast, lookup_instant};
//! use avatar_voice_relay::types::QueryType;
//!
//! assert!(lookup_instant("Hello!").is_some());
//! assert_eq!(classify_fast("bitcoin price today"), Some(QueryType::WebSearch));
//! assert_eq!(classify_fast("explain recursion"), None);
//! ```

pub mod fast;
pub mod instant;
pub mod llm;

use std::sync::Arc;

use crate::llm::LanguageModel;
use crate::types::{ClassificationResult, QueryType};

pub use fast::{classify_fast, match_rule, FastRule};
pub use instant::{is_instant_phrase, lookup_instant};
pub use llm::classify_llm;

/// Runs the three classification stages against one model.
#[derive(Clone)]
pub struct QueryClassifier {
    model: Arc<dyn LanguageModel>,
    model_name: String,
}

impl QueryClassifier {
    pub fn new(model: Arc<dyn LanguageModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Instant-table check only.
    pub fn instant(&self, transcript: &str) -> Option<ClassificationResult> {
        lookup_instant(transcript).map(ClassificationResult::instant)
    }

    /// Fast patterns, then the model. Always yields `Direct` or `WebSearch`.
    pub async fn classify_query(&self, transcript: &str) -> QueryType {
        if let Some(query_type) = classify_fast(transcript) {
            tracing::debug!(query_type = %query_type, "fast path classification");
            return query_type;
        }
        classify_llm(transcript, self.model.as_ref(), &self.model_name).await
    }

    /// Full classification including the instant table.
    pub async fn classify(&self, transcript: &str) -> ClassificationResult {
        match self.instant(transcript) {
            Some(result) => result,
            None => ClassificationResult::of(self.classify_query(transcript).await),
        }
    }
}
