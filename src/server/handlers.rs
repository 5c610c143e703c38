use axum::extract::{Extension, Multipart};
use axum::Json;
use bytes::Bytes;
use std::sync::Arc;

use super::error::ApiError;
use super::AppState;
use crate::stt::{detect_interrupt, is_valid_transcript, SttClient, SttOptions};
use crate::types::{
    ClearSessionRequest, ClearSessionResponse, HealthResponse, InterruptCheckResponse,
    ProcessQueryRequest, ProcessQueryResponse, TranscribeResponse, WebSearchRequest,
    WebSearchResponse,
};

/// Handler for `GET /health`.
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(state.pipeline.health())
}

/// Handler for `POST /api/process-query`.
pub async fn process_query(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ProcessQueryRequest>,
) -> Result<Json<ProcessQueryResponse>, ApiError> {
    state
        .pipeline
        .process_query(&payload)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_query_error(e, payload.session_or_default()))
}

/// Handler for `POST /api/web-search`.
///
/// A search that fell through to the apology still has a body, with `success: false`.
pub async fn web_search(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<WebSearchRequest>,
) -> Result<(axum::http::StatusCode, Json<WebSearchResponse>), ApiError> {
    let result = state
        .pipeline
        .web_search(&payload)
        .await
        .map_err(ApiError::from_error)?;
    let status = if result.success {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(result)))
}

/// Handler for `POST /api/clear-session`.
pub async fn clear_session(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ClearSessionRequest>,
) -> Result<Json<ClearSessionResponse>, ApiError> {
    state
        .pipeline
        .clear_session(&payload)
        .map(Json)
        .map_err(ApiError::from_error)
}

/// Handler for `POST /api/transcribe`.
pub async fn transcribe(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let stt = require_stt(&state)?;
    let upload = read_upload(multipart).await?;
    let transcription = stt
        .transcribe(upload.audio, &upload.options)
        .await
        .map_err(ApiError::from_error)?;
    Ok(Json(TranscribeResponse {
        text: transcription.text,
    }))
}

/// Handler for `POST /api/process-audio`.
///
/// Transcribe the clip, drop it if it is noise, otherwise answer it exactly
/// like `/api/process-query` would answer the transcript.
pub async fn process_audio(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ProcessQueryResponse>, ApiError> {
    let stt = require_stt(&state)?;
    let upload = read_upload(multipart).await?;
    let transcription = stt
        .transcribe(upload.audio, &upload.options)
        .await
        .map_err(ApiError::from_error)?;
    if !is_valid_transcript(&transcription.text) {
        tracing::info!(transcript = %transcription.text, "no usable speech in upload");
        return Err(ApiError::NoSpeech);
    }

    let mut request = ProcessQueryRequest::new(transcription.text);
    request.session_id = upload.session_id;
    state
        .pipeline
        .process_query(&request)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_query_error(e, request.session_or_default()))
}

/// Handler for `POST /api/check-interrupt`.
///
/// Best effort: a slow or failed transcription reports no interrupt.
pub async fn check_interrupt(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<InterruptCheckResponse>, ApiError> {
    let stt = require_stt(&state)?;
    let upload = read_upload(multipart).await?;
    let text = stt.quick_transcribe(upload.audio, state.interrupt_deadline).await;
    let interrupt = text.as_deref().map(detect_interrupt).unwrap_or(false);
    if interrupt {
        tracing::info!(text = ?text, "interrupt detected");
    }
    Ok(Json(InterruptCheckResponse { interrupt, text }))
}

fn require_stt(state: &AppState) -> Result<&SttClient, ApiError> {
    state
        .stt
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("transcription is not configured".to_string()))
}

struct AudioUpload {
    audio: Bytes,
    options: SttOptions,
    session_id: Option<String>,
}

/// Read the `audio`/`file` field (or any file field) plus an optional
/// `sessionId` text field, in whatever order the client sent them.
async fn read_upload(mut multipart: Multipart) -> Result<AudioUpload, ApiError> {
    let mut audio = None;
    let mut session_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if matches!(name.as_str(), "sessionId" | "session_id") {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read {}: {}", name, e)))?;
            session_id = Some(value);
            continue;
        }

        let is_audio = matches!(name.as_str(), "audio" | "file") || field.file_name().is_some();
        if !is_audio || audio.is_some() {
            continue;
        }
        let file_name = field.file_name().unwrap_or("audio.webm").to_string();
        let mime = field.content_type().unwrap_or("audio/webm").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;
        audio = Some((data, SttOptions::default().with_file(file_name, mime)));
    }

    match audio {
        Some((data, options)) if !data.is_empty() => Ok(AudioUpload {
            audio: data,
            options,
            session_id,
        }),
        _ => Err(ApiError::BadRequest("No audio provided".to_string())),
    }
}
