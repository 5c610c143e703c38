//! Routing decisions across the instant table, fast path and model classifier.

mod common;

use avatar_voice_relay::classify::{classify_fast, is_instant_phrase, QueryClassifier};
use avatar_voice_relay::types::QueryType;
use common::ScriptedModel;
use std::sync::Arc;

#[test]
fn instant_phrases_are_exact_matches_only() {
    assert!(is_instant_phrase("Good morning!"));
    assert!(is_instant_phrase("THANKS"));
    assert!(!is_instant_phrase("good morning, what's the news"));
    assert!(!is_instant_phrase("thanks for explaining gravity"));
}

#[test]
fn live_data_outranks_small_talk() {
    let adversarial = [
        "hi, what's the latest bitcoin price",
        "hello what's the weather",
        "thanks, any news today",
        "bye, what's the score",
    ];
    for t in adversarial {
        assert_eq!(classify_fast(t), Some(QueryType::WebSearch), "{t}");
    }
}

#[test]
fn streaming_and_release_questions_need_search() {
    assert_eq!(classify_fast("what should I watch on Netflix"), Some(QueryType::WebSearch));
    assert_eq!(classify_fast("which phones were just released"), Some(QueryType::WebSearch));
}

#[tokio::test]
async fn model_is_only_asked_when_patterns_are_silent() {
    let model = Arc::new(ScriptedModel::new().label(Some("web_search")));
    let classifier = QueryClassifier::new(model.clone(), "gpt-4.1-nano");

    assert_eq!(classifier.classify_query("good evening").await, QueryType::Direct);
    assert_eq!(classifier.classify_query("bitcoin price").await, QueryType::WebSearch);
    assert_eq!(model.classifier_calls(), 0);

    assert_eq!(
        classifier.classify_query("who is leading the tour de france").await,
        QueryType::WebSearch
    );
    assert_eq!(model.classifier_calls(), 1);
}

#[tokio::test]
async fn unexpected_model_labels_mean_direct() {
    for label in [Some("Web search please"), Some("unknown"), None] {
        let model = Arc::new(ScriptedModel::new().label(label));
        let classifier = QueryClassifier::new(model, "gpt-4.1-nano");
        assert_eq!(
            classifier.classify_query("describe the water cycle").await,
            QueryType::Direct,
            "{label:?}"
        );
    }
}

#[tokio::test]
async fn full_classification_prefers_the_instant_table() {
    let model = Arc::new(ScriptedModel::new());
    let classifier = QueryClassifier::new(model.clone(), "gpt-4.1-nano");

    let hello = classifier.classify("hello").await;
    assert_eq!(hello.query_type, QueryType::Instant);
    assert!(hello.instant_response.is_some());

    let other = classifier.classify("describe the water cycle").await;
    assert_eq!(other.query_type, QueryType::Direct);
    assert!(other.instant_response.is_none());
}
