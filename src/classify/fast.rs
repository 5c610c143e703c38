//! Regex fast path: settles obvious cases without a model call.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::QueryType;

/// Utterances with at most this many words are checked against the small-talk patterns.
pub const SHORT_UTTERANCE_WORDS: usize = 4;

static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(hi|hello|hey|howdy|good\s*(morning|afternoon|evening|night)|what'?s?\s*up|yo|sup|greetings)\b",
    )
    .expect("static regex")
});

static FAREWELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(bye|goodbye|see\s*ya|see\s+you|later|take\s*care|good\s*night|have\s*a\s*good)\b")
        .expect("static regex")
});

static THANKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(thanks?|thank\s*you|appreciate|thx|ty)\b").expect("static regex")
});

static REALTIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(",
        r"latest|current(ly)?|today|tonight|right\s*now|now|this\s+(week|weekend|month|year)",
        r"|recent(ly)?|happening|news|headlines?",
        r"|weather|temperature|forecast",
        r"|stocks?|prices?|markets?|crypto\w*|bitcoin|ethereum",
        r"|scores?|live\s+(stream|score|scores|results?|updates?|coverage)",
        r")\b",
    ))
    .expect("static regex")
});

static STREAMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bon\s+(netflix|youtube|hulu|disney|prime\s+video|amazon\s+prime|hbo|spotify|twitch|peacock|paramount)",
    )
    .expect("static regex")
});

static RECENT_RELEASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(released|announced|launched|came\s+out)\s+(recently|yesterday|today|this|last)\b",
        r"|\b(just|recently|newly)\s+(released|announced|launched|came\s+out)\b",
    ))
    .expect("static regex")
});

/// Which rule settled the classification; useful in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastRule {
    Realtime,
    Streaming,
    RecentRelease,
    Greeting,
    Farewell,
    Thanks,
}

/// Fast verdict for `transcript`, or `None` when a model has to decide.
///
/// Live-data patterns are checked first and win over small-talk patterns, so
/// "hi, what's the latest bitcoin price" is a web search.
pub fn classify_fast(transcript: &str) -> Option<QueryType> {
    match_rule(transcript).map(|rule| match rule {
        FastRule::Realtime | FastRule::Streaming | FastRule::RecentRelease => QueryType::WebSearch,
        FastRule::Greeting | FastRule::Farewell | FastRule::Thanks => QueryType::Direct,
    })
}

pub fn match_rule(transcript: &str) -> Option<FastRule> {
    let text = transcript.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if REALTIME.is_match(&text) {
        return Some(FastRule::Realtime);
    }
    if STREAMING.is_match(&text) {
        return Some(FastRule::Streaming);
    }
    if RECENT_RELEASE.is_match(&text) {
        return Some(FastRule::RecentRelease);
    }

    if text.split_whitespace().count() <= SHORT_UTTERANCE_WORDS {
        if GREETING.is_match(&text) {
            return Some(FastRule::Greeting);
        }
        if FAREWELL.is_match(&text) {
            return Some(FastRule::Farewell);
        }
        if THANKS.is_match(&text) {
            return Some(FastRule::Thanks);
        }
    }

    None
}
