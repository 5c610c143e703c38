//! Sentence-bounded truncation for spoken replies.

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").expect("static regex"));

/// Keep at most `max_sentences` leading sentences.
///
/// A sentence is a run of text closed by `.`, `!` or `?` (the terminator is
/// kept). Text with no terminator, or with no more than `max_sentences`
/// sentences, comes back trimmed but otherwise unchanged.
pub fn truncate_for_voice(text: &str, max_sentences: usize) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let sentences: Vec<&str> = SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.len() <= max_sentences {
        return text.to_string();
    }

    sentences[..max_sentences].join(" ")
}

/// Number of terminated sentences in `text`.
pub fn sentence_count(text: &str) -> usize {
    SENTENCE.find_iter(text).filter(|m| !m.as_str().trim().is_empty()).count()
}
