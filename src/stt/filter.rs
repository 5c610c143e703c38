//! Rejects transcripts that are background noise or a speech model hallucination.
//!
//! Whisper-style models turn silence and room noise into stock phrases
//! ("Thank you for watching!", "[Music]", a lone emoji). Those must never
//! reach the query pipeline as if the visitor had said them.

use once_cell::sync::Lazy;
use regex::Regex;

const MIN_TRANSCRIPT_CHARS: usize = 2;
const MIN_ALPHANUMERIC: usize = 2;

static NOISE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"📢|🔔|👍|👉|💯|✨",
        r"(?i)share.*video.*social media",
        r"(?i)subscribe.*channel",
        r"(?i)like.*comment.*subscribe",
        r"(?i)click.*link",
        r"(?i)thank.*watching",
        r"^[^a-zA-Z0-9]+$",
        r"(?i)^(um|uh|hmm|ah|oh)+\s*$",
        r"^\.+$",
        r"^\[.*\]$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

/// Whether `transcript` looks like something a visitor actually said.
pub fn is_valid_transcript(transcript: &str) -> bool {
    let trimmed = transcript.trim();
    if trimmed.chars().count() < MIN_TRANSCRIPT_CHARS {
        return false;
    }
    if let Some(pattern) = NOISE_PATTERNS.iter().find(|p| p.is_match(trimmed)) {
        tracing::debug!(transcript = %trimmed, pattern = pattern.as_str(), "transcript filtered as noise");
        return false;
    }
    trimmed.chars().filter(char::is_ascii_alphanumeric).count() >= MIN_ALPHANUMERIC
}
