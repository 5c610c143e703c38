//! Shared fixtures: a scripted language model with call counters.

#![allow(dead_code)]

use async_trait::async_trait;
use avatar_voice_relay::llm::{CompletionRequest, LanguageModel};
use avatar_voice_relay::prompts::CLASSIFICATION_PROMPT;
use avatar_voice_relay::{Error, Message, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Each route answers with its scripted text, or fails when the script is `None`.
pub struct ScriptedModel {
    pub label: Option<String>,
    pub direct: Option<String>,
    pub direct_fallback: Option<String>,
    pub search: Option<String>,
    pub search_fallback: Option<String>,
    classifier_calls: AtomicUsize,
    generation_calls: AtomicUsize,
    last_history: Mutex<Vec<Message>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            label: Some("direct".to_string()),
            direct: Some("Photosynthesis turns light into sugar. Plants love it.".to_string()),
            direct_fallback: Some("Short fallback answer.".to_string()),
            search: Some("It's sunny and 22 degrees.".to_string()),
            search_fallback: Some("Fallback search answer.".to_string()),
            classifier_calls: AtomicUsize::new(0),
            generation_calls: AtomicUsize::new(0),
            last_history: Mutex::new(Vec::new()),
        }
    }

    pub fn label(mut self, label: Option<&str>) -> Self {
        self.label = label.map(String::from);
        self
    }

    pub fn direct(mut self, primary: Option<&str>, fallback: Option<&str>) -> Self {
        self.direct = primary.map(String::from);
        self.direct_fallback = fallback.map(String::from);
        self
    }

    pub fn search(mut self, primary: Option<&str>, fallback: Option<&str>) -> Self {
        self.search = primary.map(String::from);
        self.search_fallback = fallback.map(String::from);
        self
    }

    pub fn classifier_calls(&self) -> usize {
        self.classifier_calls.load(Ordering::SeqCst)
    }

    pub fn generation_calls(&self) -> usize {
        self.generation_calls.load(Ordering::SeqCst)
    }

    pub fn last_history(&self) -> Vec<Message> {
        self.last_history.lock().unwrap().clone()
    }

    fn scripted(&self, answer: &Option<String>, route: &str) -> Result<String> {
        answer
            .clone()
            .ok_or_else(|| Error::runtime(format!("{route} unavailable")))
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        if req.system.as_deref() == Some(CLASSIFICATION_PROMPT) {
            self.classifier_calls.fetch_add(1, Ordering::SeqCst);
            return self.scripted(&self.label, "classifier");
        }
        self.generation_calls.fetch_add(1, Ordering::SeqCst);
        self.scripted(&self.direct_fallback, "direct fallback")
    }

    async fn search_complete(&self, _req: &CompletionRequest) -> Result<String> {
        self.generation_calls.fetch_add(1, Ordering::SeqCst);
        self.scripted(&self.search, "search")
    }

    async fn search_chat(&self, _req: &CompletionRequest) -> Result<String> {
        self.generation_calls.fetch_add(1, Ordering::SeqCst);
        self.scripted(&self.search_fallback, "search fallback")
    }

    async fn converse(&self, _req: &CompletionRequest, history: &[Message]) -> Result<String> {
        self.generation_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_history.lock().unwrap() = history.to_vec();
        self.scripted(&self.direct, "direct")
    }
}
