//! 响应缓存模块：按查询类型设置 TTL，避免重复的模型调用。
//!
//! # Response Caching Module
//!
//! Memoizes sanitized responses by normalized transcript so a repeated question
//! skips classification and generation entirely.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResponseCache`] | TTL map with lazy eviction and a size-triggered sweep |
//! | [`CacheConfig`] | TTLs per query type and the sweep threshold |
//! | [`CacheKey`] | Normalized query used as the map key |
//! | [`Clock`] | Time source; [`ManualClock`] lets tests move time by hand |
//!
//! ## Freshness
//!
//! `web_search` answers go stale quickly (30 s by default), `direct` answers
//! live longer (5 min). An entry stored at `T` is returned for probes in
//! `[T, T + ttl)` and dropped at `T + ttl`.
//!
//! ## Example
//!
//! ```rust
//! use avatar_voice_relay::cache::{CacheConfig, ResponseCache};
//! use avatar_voice_relay::types::QueryType;
//!
//! let cache = ResponseCache::new(CacheConfig::default());
//! cache.set("Explain photosynthesis", "Plants make sugar from light.", QueryType::Direct);
//! assert!(cache.get("explain photosynthesis!").is_some());
//! ```

mod clock;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{normalize_query, CacheKey};
pub use store::{CacheConfig, CacheEntry, CacheStats, ResponseCache};
