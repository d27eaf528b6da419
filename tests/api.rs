//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::{BrokenNarrator, FakeBackend, FakeNarrator, silent_payload, test_state};

/// Router with working narration returning `audio`
fn build_test_router(audio: &str) -> axum::Router {
    let narrator = Arc::new(FakeNarrator {
        audio: audio.to_string(),
    });
    katha::api::router(test_state(FakeBackend::default(), Some(narrator)))
}

/// Router without any narration service configured
fn build_unconfigured_router() -> axum::Router {
    katha::api::router(test_state::<FakeNarrator>(FakeBackend::default(), None))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router("AAAA");
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_stories_by_region() {
    let app = build_test_router("AAAA");
    let (status, body) = send(&app, get("/api/stories?region=kerala")).await;

    assert_eq!(status, StatusCode::OK);
    let stories = body["stories"].as_array().unwrap();
    assert_eq!(stories.len(), 2);
    assert!(stories.iter().all(|s| s["region"] == "Kerala"));
}

#[tokio::test]
async fn test_list_stories_by_theme() {
    let app = build_test_router("AAAA");
    let (status, body) = send(&app, get("/api/stories?region=Bengali&theme=Trickster")).await;

    assert_eq!(status, StatusCode::OK);
    let stories = body["stories"].as_array().unwrap();
    assert!(!stories.is_empty());
    assert!(stories.iter().any(|s| s["id"] == "bengali-gopal-bhar"));
}

#[tokio::test]
async fn test_list_all_stories() {
    let app = build_test_router("AAAA");
    let (status, body) = send(&app, get("/api/stories")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stories"].as_array().unwrap().len(), 13);
}

#[tokio::test]
async fn test_unknown_region() {
    let app = build_test_router("AAAA");
    let (status, body) = send(&app, get("/api/stories?region=Atlantis")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_region_themes() {
    let app = build_test_router("AAAA");
    let (status, body) = send(&app, get("/api/regions/Tamil/themes")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["region"], "Tamil");
    let themes = body["themes"].as_array().unwrap();
    assert!(!themes.is_empty());
    assert!(themes.len() <= 10);
}

#[tokio::test]
async fn test_expand_story() {
    let app = build_test_router("AAAA");
    let (status, body) = send(
        &app,
        post_json("/api/expand-story", &json!({ "story_id": "kerala-mahabali" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["fullNarration"].as_str().unwrap().starts_with("Long ago"));
    assert_eq!(body["intensity"], 7);
    assert!(body.get("audioUri").is_none());
}

#[tokio::test]
async fn test_expand_unknown_story() {
    let app = build_test_router("AAAA");
    let (status, _) = send(
        &app,
        post_json("/api/expand-story", &json!({ "story_id": "nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expand_story_upstream_failure() {
    let app = katha::api::router(test_state(
        FakeBackend::default(),
        Some(Arc::new(BrokenNarrator)),
    ));
    let (status, body) = send(
        &app,
        post_json("/api/expand-story", &json!({ "story_id": "tamil-kannagi" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "analysis_failed");
}

#[tokio::test]
async fn test_narration_not_configured() {
    let app = build_unconfigured_router();
    let (status, body) = send(
        &app,
        post_json("/api/expand-story", &json!({ "story_id": "tamil-kannagi" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "not_configured");
}

#[tokio::test]
async fn test_synthesize_audio() {
    let app = build_test_router("AAAA");
    let (status, body) = send(
        &app,
        post_json(
            "/api/synthesize-audio",
            &json!({ "text": "Once upon a time", "language": "Tamil" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["audio_uri"], "data:audio/pcm;base64,AAAA");
}

#[tokio::test]
async fn test_synthesize_empty_audio() {
    let app = build_test_router("");
    let (status, body) = send(
        &app,
        post_json("/api/synthesize-audio", &json!({ "text": "Once upon a time" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "empty_synthesis");
}

#[tokio::test]
async fn test_synthesize_blank_text() {
    let app = build_test_router("AAAA");
    let (status, _) = send(
        &app,
        post_json("/api/synthesize-audio", &json!({ "text": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_playback_controls() {
    let app = build_test_router("AAAA");

    let (status, body) = send(&app, get("/api/playback/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");

    let (status, body) = send(
        &app,
        post_json("/api/playback/play", &json!({ "payload": silent_payload(240) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "playing");
    assert!(body["session"].is_u64());

    let (_, body) = send(&app, post_empty("/api/playback/toggle")).await;
    assert_eq!(body["status"], "paused");

    let (_, body) = send(&app, post_empty("/api/playback/toggle")).await;
    assert_eq!(body["status"], "playing");

    let (status, body) = send(&app, post_empty("/api/playback/stop")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn test_play_malformed_payload() {
    let app = build_test_router("AAAA");
    let (status, body) = send(
        &app,
        post_json("/api/playback/play", &json!({ "payload": "%%%" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "malformed_payload");

    let (_, body) = send(&app, get("/api/playback/status")).await;
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn test_play_without_output_device() {
    let app = katha::api::router(test_state::<FakeNarrator>(FakeBackend::unavailable(), None));
    let (status, body) = send(
        &app,
        post_json("/api/playback/play", &json!({ "payload": silent_payload(8) })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "sink_unavailable");
}
