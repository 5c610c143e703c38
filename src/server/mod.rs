//! HTTP 接口：axum 路由、共享状态与错误映射。
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /health` | [`handlers::health`] |
//! | `POST /api/process-query` | [`handlers::process_query`] |
//! | `POST /api/web-search` | [`handlers::web_search`] |
//! | `POST /api/clear-session` | [`handlers::clear_session`] |
//! | `POST /api/transcribe` | [`handlers::transcribe`] |
//! | `POST /api/process-audio` | [`handlers::process_audio`] |
//! | `POST /api/check-interrupt` | [`handlers::check_interrupt`] |

pub mod error;
pub mod handlers;

use axum::extract::{DefaultBodyLimit, Extension};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ProviderKind, RelayConfig};
use crate::pipeline::QueryPipeline;
use crate::stt::SttClient;
use crate::Result;

pub use error::ApiError;

/// Audio uploads are short utterances; 25 MiB matches the transcription API's own limit.
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

pub struct AppState {
    pub pipeline: QueryPipeline,
    /// `None` when no OpenAI key is available; the audio routes then answer 503.
    pub stt: Option<SttClient>,
    pub interrupt_deadline: Duration,
}

impl AppState {
    pub fn new(pipeline: QueryPipeline) -> Self {
        Self {
            pipeline,
            stt: None,
            interrupt_deadline: Duration::from_millis(3000),
        }
    }

    pub fn with_stt(mut self, stt: SttClient) -> Self {
        self.stt = Some(stt);
        self
    }

    pub fn with_interrupt_deadline(mut self, deadline: Duration) -> Self {
        self.interrupt_deadline = deadline;
        self
    }

    /// Everything the binary needs: provider adapter, pipeline and, if a key exists, STT.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let pipeline = QueryPipeline::from_config(config)?;
        let openai_key = match config.provider.kind {
            ProviderKind::OpenAi => config.provider.api_key.clone(),
            ProviderKind::Gemini => None,
        };
        let mut stt = SttClient::builder()
            .model(&config.models.stt)
            .base_url(&config.provider.openai_base_url)
            .timeout(Duration::from_secs(config.provider.timeout_secs));
        if let Some(key) = openai_key {
            stt = stt.api_key(key);
        }
        let stt = stt.build();
        let state = Self::new(pipeline)
            .with_interrupt_deadline(Duration::from_millis(config.voice.interrupt_deadline_ms));
        Ok(match stt {
            Ok(stt) => state.with_stt(stt),
            Err(e) => {
                tracing::warn!(error = %e, "speech-to-text disabled");
                state
            }
        })
    }
}

pub fn router(state: AppState) -> Router {
    let audio_routes = Router::new()
        .route("/api/transcribe", post(handlers::transcribe))
        .route("/api/process-audio", post(handlers::process_audio))
        .route("/api/check-interrupt", post(handlers::check_interrupt))
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/process-query", post(handlers::process_query))
        .route("/api/web-search", post(handlers::web_search))
        .route("/api/clear-session", post(handlers::clear_session))
        .merge(audio_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
