//! # avatar-voice-relay
//!
//! 语音头像助手的中继服务：判断每句用户语音该即时回复、直接回答还是联网搜索，
//! 调用模型生成回答，再清理成适合朗读的短句并缓存。
//!
//! Relay between a talking-avatar frontend and language-model providers. Each
//! transcript is classified, answered, cleaned up for text-to-speech and cached.
//!
//! ## Overview
//!
//! - **Three-way routing**: canned instant replies, direct model answers, and
//!   search-backed answers for anything that needs live data.
//! - **Cheap first**: an instant-reply table and regex fast path settle most
//!   small talk and obvious live-data questions without a model call.
//! - **Always answers**: every generation branch has one fallback and a spoken
//!   apology, so the avatar never goes silent.
//! - **Speakable output**: markdown, URLs and citation clutter are stripped and
//!   replies are cut to a few sentences.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use avatar_voice_relay::config::RelayConfig;
//! use avatar_voice_relay::pipeline::QueryPipeline;
//! use avatar_voice_relay::types::ProcessQueryRequest;
//!
//! #[tokio::main]
//! async fn main() -> avatar_voice_relay::Result<()> {
//!     let config = RelayConfig::load(None)?;
//!     let pipeline = QueryPipeline::from_config(&config)?;
//!
//!     let reply = pipeline
//!         .process_query(&ProcessQueryRequest::new("what's the weather in Paris right now"))
//!         .await?;
//!     println!("{} ({:?})", reply.response, reply.query_type);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | Per-query orchestration: instant → cache → classify → generate → voice |
//! | [`classify`] | Instant table, regex fast path, model classifier |
//! | [`generate`] | Direct and web-search generation with fallback |
//! | [`voice`] | Sanitizing and truncating text for speech |
//! | [`cache`] | TTL response cache with an injectable clock |
//! | [`conversation`] | Per-session conversation memory |
//! | [`llm`] | Provider-neutral model trait, OpenAI and Gemini adapters |
//! | [`stt`] | Speech-to-text and interrupt detection |
//! | [`server`] | axum routes |
//! | [`config`] | YAML + environment configuration |

pub mod cache;
pub mod classify;
pub mod config;
pub mod conversation;
pub mod generate;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod stt;
pub mod transport;
pub mod types;
pub mod voice;

pub use pipeline::{QueryPipeline, QueryPipelineBuilder};
pub use types::{Message, MessageRole, QueryType};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
