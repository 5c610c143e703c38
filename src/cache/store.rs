//! In-memory response cache with per-query-type TTLs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use super::key::CacheKey;
use crate::config::CacheSettings;
use crate::types::QueryType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub response: String,
    pub timestamp: Instant,
    pub query_type: QueryType,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub direct_ttl: Duration,
    pub search_ttl: Duration,
    /// Size above which a write triggers a sweep of entries older than the longest TTL.
    pub sweep_threshold: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            direct_ttl: Duration::from_secs(5 * 60),
            search_ttl: Duration::from_secs(30),
            sweep_threshold: 100,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(s: &CacheSettings) -> Self {
        Self {
            direct_ttl: s.direct_ttl(),
            search_ttl: s.search_ttl(),
            sweep_threshold: s.sweep_threshold,
        }
    }
}

impl CacheConfig {
    pub fn ttl_for(&self, query_type: QueryType) -> Duration {
        match query_type {
            QueryType::WebSearch => self.search_ttl,
            QueryType::Direct | QueryType::Instant => self.direct_ttl,
        }
    }

    fn max_ttl(&self) -> Duration {
        self.direct_ttl.max(self.search_ttl)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub expired: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    expired: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide memo of sanitized responses keyed by normalized transcript.
///
/// The lock is never held across an `.await`.
pub struct ResponseCache {
    config: CacheConfig,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
    stats: AtomicStats,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
            clock,
            stats: AtomicStats::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fresh entry for `query`, or `None`. Stale entries are removed on the way out.
    ///
    /// Queries with nothing left after normalization (punctuation, emoji) never hit.
    pub fn get(&self, query: &str) -> Option<CacheEntry> {
        let key = CacheKey::from_query(query);
        if key.is_empty() {
            return None;
        }
        let now = self.clock.now();
        let mut entries = self.lock();

        let Some(entry) = entries.get(&key) else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let ttl = self.config.ttl_for(entry.query_type);
        if now.saturating_duration_since(entry.timestamp) >= ttl {
            entries.remove(&key);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, query_type = %entry.query_type, "cache hit");
        Some(entry.clone())
    }

    /// Store `response`, replacing any previous entry for the same normalized query.
    /// Queries that normalize to an empty key are not stored.
    pub fn set(&self, query: &str, response: impl Into<String>, query_type: QueryType) {
        let key = CacheKey::from_query(query);
        if key.is_empty() {
            return;
        }
        let now = self.clock.now();
        let mut entries = self.lock();

        entries.insert(
            key,
            CacheEntry {
                response: response.into(),
                timestamp: now,
                query_type,
            },
        );
        self.stats.sets.fetch_add(1, Ordering::Relaxed);

        if entries.len() > self.config.sweep_threshold {
            let max_ttl = self.config.max_ttl();
            let before = entries.len();
            entries.retain(|_, e| now.saturating_duration_since(e.timestamp) < max_ttl);
            tracing::debug!(
                removed = before - entries.len(),
                remaining = entries.len(),
                "cache sweep complete"
            );
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
        tracing::info!("response cache cleared");
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn cache_with_clock() -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::with_clock(CacheConfig::default(), clock.clone());
        (cache, clock)
    }

    #[test]
    fn search_entries_live_for_thirty_seconds() {
        let (cache, clock) = cache_with_clock();
        cache.set("bitcoin price", "About sixty thousand.", QueryType::WebSearch);

        clock.advance(Duration::from_millis(29_999));
        assert_eq!(
            cache.get("bitcoin price").map(|e| e.response),
            Some("About sixty thousand.".to_string())
        );

        clock.advance(Duration::from_millis(1));
        assert!(cache.get("bitcoin price").is_none());
        assert_eq!(cache.len(), 0, "expired entry is evicted on lookup");
    }

    #[test]
    fn direct_entries_live_for_five_minutes() {
        let (cache, clock) = cache_with_clock();
        cache.set("explain photosynthesis", "Plants turn light into sugar.", QueryType::Direct);

        clock.advance(Duration::from_secs(299));
        assert!(cache.get("Explain photosynthesis?").is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("explain photosynthesis").is_none());
    }

    #[test]
    fn later_write_replaces_earlier() {
        let (cache, _clock) = cache_with_clock();
        cache.set("who won", "First.", QueryType::Direct);
        cache.set("Who won?", "Second.", QueryType::WebSearch);
        assert_eq!(cache.len(), 1);
        let entry = cache.get("who won").unwrap();
        assert_eq!(entry.response, "Second.");
        assert_eq!(entry.query_type, QueryType::WebSearch);
    }

    #[test]
    fn sweep_drops_entries_older_than_longest_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::with_clock(
            CacheConfig {
                sweep_threshold: 3,
                ..CacheConfig::default()
            },
            clock.clone(),
        );
        cache.set("old one", "a", QueryType::Direct);
        cache.set("old two", "b", QueryType::WebSearch);
        clock.advance(Duration::from_secs(301));
        cache.set("fresh one", "c", QueryType::Direct);
        assert_eq!(cache.len(), 3, "no sweep at the threshold itself");

        cache.set("fresh two", "d", QueryType::Direct);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("fresh one").is_some());
        assert!(cache.get("fresh two").is_some());
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let (cache, _clock) = cache_with_clock();
        assert!(cache.get("nothing").is_none());
        cache.set("something", "yes", QueryType::Direct);
        assert!(cache.get("something").is_some());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn queries_without_words_are_never_cached() {
        let (cache, _clock) = cache_with_clock();
        cache.set("?!", "Happy to help.", QueryType::Direct);
        assert!(cache.is_empty());
        assert!(cache.get("👍").is_none());
        assert!(cache.get("?!").is_none());
        assert_eq!(cache.stats().sets, 0);
    }

    #[test]
    fn clear_empties_everything() {
        let (cache, _clock) = cache_with_clock();
        cache.set("a", "1", QueryType::Direct);
        cache.set("b", "2", QueryType::WebSearch);
        cache.clear();
        assert!(cache.is_empty());
    }
}
