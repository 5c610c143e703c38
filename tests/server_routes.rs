//! Router-level tests via `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use avatar_voice_relay::server::{router, AppState};
use avatar_voice_relay::stt::SttClient;
use avatar_voice_relay::QueryPipeline;
use common::ScriptedModel;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "relay-test-boundary";

fn app_with(model: ScriptedModel) -> Router {
    let pipeline = QueryPipeline::builder(Arc::new(model)).build();
    router(AppState::new(pipeline))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_audio(uri: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"clip.webm\"\r\n\
         Content-Type: audio/webm\r\n\r\nnot-really-audio\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// The browser's shape: the clip as `file`, followed by a `sessionId` text field.
fn post_clip_with_session(uri: &str, session_id: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"audio.webm\"\r\n\
         Content-Type: audio/webm\r\n\r\nnot-really-audio\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"sessionId\"\r\n\r\n{s}\r\n--{b}--\r\n",
        b = BOUNDARY,
        s = session_id
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// An app whose speech-to-text always hears `heard`. Keep the server alive for the test.
async fn app_hearing(heard: &str, model: Arc<ScriptedModel>) -> (Router, mockito::ServerGuard) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "text": heard }).to_string())
        .create_async()
        .await;
    let stt = SttClient::builder()
        .api_key("sk-test")
        .base_url(server.url())
        .build()
        .unwrap();
    let pipeline = QueryPipeline::builder(model).build();
    (router(AppState::new(pipeline).with_stt(stt)), server)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = app_with(ScriptedModel::new());
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models"]["main"], "gpt-4.1-mini");
    assert_eq!(body["cache_entries"], 0);
}

#[tokio::test]
async fn process_query_answers() {
    let app = app_with(ScriptedModel::new());
    let req = post_json(
        "/api/process-query",
        json!({ "transcript": "what's the weather right now", "sessionId": "abc" }),
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["query_type"], "web_search");
    assert_eq!(body["session_id"], "abc");
    assert_eq!(body["cached"], false);
    assert!(body["processing_time_ms"].is_u64());
    assert!(!body["response"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn empty_transcript_is_bad_request() {
    let app = app_with(ScriptedModel::new());

    let response = app
        .clone()
        .oneshot(post_json("/api/process-query", json!({ "transcript": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("transcript"));

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(read_json(health).await["cache_entries"], 0);
}

#[tokio::test]
async fn generation_failure_is_still_a_spoken_answer() {
    let app = app_with(ScriptedModel::new().direct(None, None));
    let response = app
        .oneshot(post_json(
            "/api/process-query",
            json!({ "transcript": "explain photosynthesis" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["query_type"], "direct");
    assert!(body["response"].as_str().unwrap().starts_with("Sorry"));
}

#[tokio::test]
async fn web_search_route() {
    let ok = app_with(ScriptedModel::new())
        .oneshot(post_json("/api/web-search", json!({ "query": "weather in Oslo" })))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body = read_json(ok).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["has_search_results"], true);
    assert_eq!(body["query"], "weather in Oslo");

    let down = app_with(ScriptedModel::new().search(None, None))
        .oneshot(post_json("/api/web-search", json!({ "query": "weather in Oslo" })))
        .await
        .unwrap();
    assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json(down).await["success"], false);

    let empty = app_with(ScriptedModel::new())
        .oneshot(post_json("/api/web-search", json!({ "query": "" })))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clear_session_route() {
    let app = app_with(ScriptedModel::new());

    app.clone()
        .oneshot(post_json(
            "/api/process-query",
            json!({ "transcript": "tell me a joke", "session_id": "s-9" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/api/clear-session", json!({ "sessionId": "s-9" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["cleared"], true);

    let missing = app
        .oneshot(post_json("/api/clear-session", json!({})))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn audio_routes_need_transcription() {
    let app = app_with(ScriptedModel::new());
    let response = app.clone().oneshot(post_audio("/api/transcribe")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .oneshot(post_clip_with_session("/api/process-audio", "visitor-7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn process_audio_answers_what_was_said() {
    let model = Arc::new(ScriptedModel::new());
    let (app, _server) = app_hearing("What's the weather right now?", model.clone()).await;

    let response = app
        .oneshot(post_clip_with_session("/api/process-audio", "visitor-7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["query_type"], "web_search");
    assert_eq!(body["session_id"], "visitor-7");
    assert_eq!(body["cached"], false);
    assert_eq!(body["response"], "It's sunny and 22 degrees.");
    assert_eq!(model.generation_calls(), 1);
}

#[tokio::test]
async fn process_audio_drops_noise_transcripts() {
    let model = Arc::new(ScriptedModel::new());
    let (app, _server) = app_hearing("Thank you for watching!", model.clone()).await;

    let response = app
        .clone()
        .oneshot(post_clip_with_session("/api/process-audio", "visitor-7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(read_json(response).await["error"].is_string());
    assert_eq!(model.classifier_calls(), 0);
    assert_eq!(model.generation_calls(), 0);

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(read_json(health).await["cache_entries"], 0);
}

#[tokio::test]
async fn process_audio_without_a_clip_is_bad_request() {
    let (app, _server) = app_hearing("hello there", Arc::new(ScriptedModel::new())).await;
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"sessionId\"\r\n\r\nvisitor-7\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/process-audio")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_interrupt_detects_stop_words() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"Hold on a second."}"#)
        .create_async()
        .await;

    let stt = SttClient::builder()
        .api_key("sk-test")
        .base_url(server.url())
        .build()
        .unwrap();
    let pipeline = QueryPipeline::builder(Arc::new(ScriptedModel::new())).build();
    let app = router(AppState::new(pipeline).with_stt(stt));

    let response = app
        .clone()
        .oneshot(post_audio("/api/check-interrupt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["interrupt"], true);
    assert_eq!(body["text"], "Hold on a second.");

    let response = app.oneshot(post_audio("/api/transcribe")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["text"], "Hold on a second.");
}
