use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::types::{ProcessQueryResponse, ResponseKind};
use crate::Error;

/// Spoken when processing fails outright.
pub const PROCESSING_APOLOGY: &str = "Sorry, I couldn't process your request.";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Well-formed upload that held no usable speech.
    NoSpeech,
    ServiceUnavailable(String),
    InternalServerError(String),
    /// A process-query failure; the body still carries a speakable reply.
    QueryFailed { session_id: String },
}

impl ApiError {
    /// Map a pipeline error: validation problems are the caller's fault, the rest are ours.
    pub fn from_error(err: Error) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            tracing::error!(error = %err, "request failed");
            ApiError::InternalServerError(err.to_string())
        }
    }

    pub fn from_query_error(err: Error, session_id: String) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            tracing::error!(error = %err, %session_id, "query processing failed");
            ApiError::QueryFailed { session_id }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NoSpeech => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "No clear speech detected".to_string(),
            ),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::QueryFailed { session_id } => {
                let body = ProcessQueryResponse {
                    response: PROCESSING_APOLOGY.to_string(),
                    query_type: ResponseKind::Error,
                    processing_time_ms: 0,
                    session_id,
                    cached: false,
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
