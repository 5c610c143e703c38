//! STT（语音转文字）模块：上传音频转录，以及打断关键词的快速检测。
//!
//! Two uses: full transcription of a user's utterance (`/api/transcribe`,
//! `/api/process-audio`), and a deadline-bounded quick pass that only looks for
//! stop words while the avatar is still speaking (`/api/check-interrupt`).
//! Transcripts headed for the query pipeline go through [`is_valid_transcript`]
//! first so room noise never becomes a question.

mod client;
mod filter;
mod interrupt;
mod types;

pub use client::{SttClient, SttClientBuilder};
pub use filter::is_valid_transcript;
pub use interrupt::detect_interrupt;
pub use types::{SttOptions, Transcription};
