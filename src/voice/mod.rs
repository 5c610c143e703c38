//! 语音输出模块：清理模型文本中的 Markdown、链接与引用，并按句截断以便朗读。
//!
//! # Voice Output Module
//!
//! Raw model output is full of things that sound terrible when spoken:
//! markdown, URLs, `[1]`-style citations, "according to ..." preambles and
//! paragraphs that run on for a minute. This module turns it into short,
//! plain, speakable text.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`sanitize_for_voice`] | Ordered regex cleanup, whitespace collapsing |
//! | [`truncate_for_voice`] | Keep the first N sentences |
//! | [`prepare_for_voice`] | Both, in that order |
//!
//! ```rust
//! use avatar_voice_relay::voice::prepare_for_voice;
//!
//! let raw = "According to Reuters [1], **Bitcoin** is up. It rose 3%. Analysts cheered. More soon.";
//! assert_eq!(prepare_for_voice(raw, 2), "Bitcoin is up. It rose 3%.");
//! ```

mod sanitize;
mod truncate;

pub use sanitize::{sanitize_for_voice, SanitizeRule, VoiceSanitizer};
pub use truncate::{sentence_count, truncate_for_voice};

/// Sanitize, then truncate to `max_sentences`.
pub fn prepare_for_voice(text: &str, max_sentences: usize) -> String {
    truncate_for_voice(&sanitize_for_voice(text), max_sentences)
}
