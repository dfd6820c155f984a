//! HTTP API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`, backed by
//! a voice engine double and a temporary artifact directory.

mod fixtures;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use fixtures::*;
use splice_gateway::AppState;
use splice_gateway::core::tts::Synthesizer;
use splice_gateway::routes::api::create_api_router;

const BOUNDARY: &str = "splice-test-boundary";

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _dir: TempDir,
}

async fn app_with(synthesizer: Arc<dyn Synthesizer>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir.path().join("artifacts"));
    let state = AppState::with_synthesizer(config, synthesizer).await.unwrap();
    let router = create_api_router().with_state(state.clone());
    TestApp {
        router,
        state,
        _dir: dir,
    }
}

async fn app() -> TestApp {
    app_with(Arc::new(SilenceSynthesizer::new(1.0))).await
}

async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A multipart part: (field name, optional filename, content)
type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

fn audio_part(content: &[u8]) -> Part<'_> {
    ("audio", Some("base.wav"), content)
}

fn text_part<'a>(name: &'a str, content: &'a [u8]) -> Part<'a> {
    (name, None, content)
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn stretch_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// =============================================================================
// Health and speak
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let response = send(&app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "OK");
}

#[tokio::test]
async fn test_speak_get_returns_wav() {
    let app = app().await;
    let response = send(&app, get("/?text=hello%20world")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");

    let wav = body_bytes(response).await;
    assert_duration(wav_duration_secs(&wav), 1.0);
}

#[tokio::test]
async fn test_speak_without_text_is_bad_request() {
    let app = app().await;

    for uri in ["/", "/?text=", "/?text=%20%20"] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["error"], "No text provided");
    }
}

#[tokio::test]
async fn test_speak_post_uses_body() {
    let synth = Arc::new(SilenceSynthesizer::new(0.5));
    let app = app_with(synth.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from("Good morning"))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(synth.requests(), vec!["Good morning"]);
}

#[tokio::test]
async fn test_engine_failure_is_bad_gateway() {
    let app = app_with(Arc::new(FailingSynthesizer)).await;
    let response = send(&app, get("/?text=hello")).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_json(response).await["error"].is_string());
}

// =============================================================================
// Stored artifacts
// =============================================================================

#[tokio::test]
async fn test_stored_artifact_lifecycle() {
    let app = app().await;

    let response = send(&app, get("/?text=keep%20me&store=true")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(
        body["url"].as_str().unwrap(),
        format!("http://localhost:5000/file/{id}")
    );
    assert_eq!(body["expires_in_minutes"], 20);

    let response = send(&app, get(&format!("/file/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    assert_duration(wav_duration_secs(&body_bytes(response).await), 1.0);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/file/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, delete).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, get(&format!("/file/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_artifact_is_not_found() {
    let app = app().await;

    let response = send(&app, get("/file/0123456789abcdef0123456789abcdef")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, get("/file/not-an-id")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/file/0123456789abcdef0123456789abcdef")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, delete).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failure_falls_back_to_inline_audio() {
    let app = app().await;

    // Replace the storage root with a plain file so writes cannot succeed
    let root = app.state.artifacts.root().to_path_buf();
    std::fs::remove_dir_all(&root).unwrap();
    std::fs::write(&root, b"not a directory").unwrap();

    let response = send(&app, get("/?text=hello&store=true")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    assert_duration(wav_duration_secs(&body_bytes(response).await), 1.0);
}

// =============================================================================
// Stretch
// =============================================================================

#[tokio::test]
async fn test_stretch_returns_processed_wav() {
    let synth = Arc::new(SilenceSynthesizer::new(1.5));
    let app = app_with(synth.clone()).await;

    let base = silence_wav(10.0);
    let placeholders = br#"[{"start_time": 0.0, "end_time": 2.0, "text_value": "hello"}]"#;
    let request = stretch_request(
        "/stretch",
        &[
            audio_part(&base),
            text_part("placeholders", placeholders),
        ],
    );

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=processed.wav"
    );
    assert_duration(wav_duration_secs(&body_bytes(response).await), 9.5);
    assert_eq!(synth.requests(), vec!["hello"]);
}

#[tokio::test]
async fn test_stretch_store_field_returns_artifact() {
    let app = app().await;

    let base = tone_wav(3.0);
    let placeholders = br#"[{"start_time": 1.0, "end_time": 2.0, "text_value": ""}]"#;
    let request = stretch_request(
        "/stretch",
        &[
            audio_part(&base),
            text_part("placeholders", placeholders),
            text_part("store", b"true"),
        ],
    );

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let id = body_json(response).await["id"].as_str().unwrap().to_string();
    let wav = app.state.artifacts.read(&id).await.unwrap();
    assert_duration(wav_duration_secs(&wav), 2.0);
}

#[tokio::test]
async fn test_stretch_missing_fields() {
    let app = app().await;
    let base = silence_wav(1.0);

    let response = send(
        &app,
        stretch_request("/stretch", &[text_part("placeholders", b"[]")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No audio file provided");

    let response = send(
        &app,
        stretch_request("/stretch", &[audio_part(&base)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No placeholders provided");
}

#[tokio::test]
async fn test_stretch_rejects_invalid_placeholders() {
    let synth = Arc::new(SilenceSynthesizer::new(1.0));
    let app = app_with(synth.clone()).await;
    let base = silence_wav(5.0);

    let cases: [&[u8]; 4] = [
        b"not json",
        br#"[{"start_time": 2.0, "end_time": 1.0, "text_value": "x"}]"#,
        br#"[{"start_time": -1.0, "end_time": 1.0, "text_value": "x"}]"#,
        br#"[{"start_time": 1.0, "end_time": 3.0, "text_value": "a"},
             {"start_time": 2.0, "end_time": 4.0, "text_value": "b"}]"#,
    ];

    for placeholders in cases {
        let request = stretch_request(
            "/stretch",
            &[
                audio_part(&base),
                text_part("placeholders", placeholders),
            ],
        );
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert!(synth.requests().is_empty());
}

#[tokio::test]
async fn test_stretch_undecodable_audio_is_bad_request() {
    let app = app().await;

    let request = stretch_request(
        "/stretch",
        &[
            audio_part(b"definitely not audio"),
            text_part("placeholders", b"[]"),
        ],
    );
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stretch_engine_failure_is_bad_gateway() {
    let app = app_with(Arc::new(FailingSynthesizer)).await;
    let base = silence_wav(3.0);

    let request = stretch_request(
        "/stretch",
        &[
            audio_part(&base),
            (
                "placeholders",
                None,
                br#"[{"start_time": 0.5, "end_time": 1.0, "text_value": "hi"}]"#,
            ),
        ],
    );
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
