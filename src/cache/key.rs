//! Cache key generation.
//!
//! Keys are the normalized transcript itself, so "Explain photosynthesis!" and
//! "  explain   photosynthesis " share an entry. The instant-response table is
//! keyed the same way.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s']").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Lowercase, trim, drop everything but word characters, whitespace and
/// apostrophes, collapse whitespace runs to one space.
pub fn normalize_query(query: &str) -> String {
    let lower = query.to_lowercase();
    let stripped = NON_WORD.replace_all(lower.trim(), "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_query(query: &str) -> Self {
        Self(normalize_query(query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::from_query(s)
    }
}
