//! Model fallback for transcripts the fast path could not settle.

use crate::llm::{CompletionRequest, LanguageModel};
use crate::prompts::CLASSIFICATION_PROMPT;
use crate::types::QueryType;

/// Ask `model` for a one-word label. Never fails: errors and unexpected answers mean `Direct`.
pub async fn classify_llm(transcript: &str, model: &dyn LanguageModel, model_name: &str) -> QueryType {
    let req = CompletionRequest::new(model_name)
        .system(CLASSIFICATION_PROMPT)
        .user(transcript)
        .temperature(0.0)
        .max_tokens(10);

    match model.complete(&req).await {
        Ok(answer) => {
            let query_type = parse_label(&answer);
            tracing::debug!(answer = %answer.trim(), query_type = %query_type, "model classification");
            query_type
        }
        Err(e) => {
            tracing::warn!(error = %e, "classifier call failed, defaulting to direct");
            QueryType::Direct
        }
    }
}

/// Exactly `web_search` (any case, surrounding whitespace) is a web search; anything else is direct.
pub fn parse_label(answer: &str) -> QueryType {
    if answer.trim().to_lowercase() == "web_search" {
        QueryType::WebSearch
    } else {
        QueryType::Direct
    }
}
