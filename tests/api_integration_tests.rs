//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a stub synthesizer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde_json::Value;
use speech_cache::{
    api::create_router, cache::CacheStore, error::SynthesisError, synth::Synthesizer, AppState,
    AudioFetcher, VariantOptions,
};
use tower::ServiceExt;

// == Helper Types ==

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
}

struct StubSynthesizer {
    calls: AtomicUsize,
    delay: Duration,
    behavior: Behavior,
}

impl StubSynthesizer {
    fn new(delay: Duration, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            behavior,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for StubSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        lang: &str,
        variant: &VariantOptions,
    ) -> Result<Bytes, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match self.behavior {
            Behavior::Succeed => Ok(Bytes::from(format!(
                "{}|{}|{}",
                lang,
                variant.codec.format_name(),
                text
            ))),
            Behavior::Fail => Err(SynthesisError::EncodingFailed("ffmpeg exited with 1".into())),
        }
    }
}

// == Helper Functions ==

fn create_app(stub: Arc<StubSynthesizer>, capacity: usize, timeout: Duration) -> Router {
    let store = CacheStore::new(capacity, Duration::from_secs(300)).into_shared();
    let fetcher = AudioFetcher::new(store, stub, timeout);
    create_router(AppState::new(fetcher))
}

fn create_test_app(stub: Arc<StubSynthesizer>) -> Router {
    create_app(stub, 100, Duration::from_secs(5))
}

fn speak_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/speak")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn speak(app: &Router, text: &str) -> (StatusCode, Value) {
    let body = format!(r#"{{"text":"{}","lang":"en"}}"#, text);
    let response = app.clone().oneshot(speak_request(&body)).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn stats(app: &Router) -> Value {
    let response = app.clone().oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await
}

// == SPEAK Endpoint Tests ==

#[tokio::test]
async fn test_speak_endpoint_success() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_test_app(stub.clone());

    let (status, json) = speak(&app, "hello world").await;

    assert_eq!(status, StatusCode::OK);
    let audio = STANDARD.decode(json["audio"].as_str().unwrap()).unwrap();
    assert_eq!(audio, b"en|mp3|hello world");
    assert_eq!(json["key"].as_str().unwrap().len(), 64);
    assert_eq!(json["codec"], "mp3");
    assert_eq!(json["encoding"], "gzip");
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_speak_repeat_is_served_from_cache() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_test_app(stub.clone());

    let (_, first) = speak(&app, "hello").await;
    let (_, second) = speak(&app, "hello").await;

    assert_eq!(first["audio"], second["audio"]);
    assert_eq!(stub.calls(), 1);

    let json = stats(&app).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
}

#[tokio::test]
async fn test_speak_variant_changes_payload_identity() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_test_app(stub.clone());

    let (_, default) = speak(&app, "hello").await;
    let response = app
        .clone()
        .oneshot(speak_request(
            r#"{"text":"hello","lang":"en","variant":{"codec":"ogg","gzip":false}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ogg = body_to_json(response.into_body()).await;

    assert_ne!(default["key"], ogg["key"]);
    assert_eq!(ogg["codec"], "ogg");
    assert_eq!(ogg["encoding"], "identity");
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn test_speak_generation_failure() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Fail);
    let app = create_test_app(stub);

    let (status, json) = speak(&app, "hello").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("ffmpeg"));
    assert_eq!(stats(&app).await["total_entries"], 0);
}

#[tokio::test]
async fn test_speak_timeout() {
    let stub = StubSynthesizer::new(Duration::from_millis(300), Behavior::Succeed);
    let app = create_app(stub, 100, Duration::from_millis(50));

    let (status, json) = speak(&app, "slow").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(json["error"].is_string());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(stats(&app).await["total_entries"], 0);
}

#[tokio::test]
async fn test_speak_empty_lang_rejected() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_test_app(stub.clone());

    let response = app
        .oneshot(speak_request(r#"{"text":"hello","lang":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_speak_malformed_body_rejected() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_test_app(stub.clone());

    let response = app
        .clone()
        .oneshot(speak_request(r#"{"text": "missing lang"}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = app.oneshot(speak_request("not json")).await.unwrap();
    assert!(response.status().is_client_error());
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_speak_concurrent_requests_share_one_synthesis() {
    let stub = StubSynthesizer::new(Duration::from_millis(100), Behavior::Succeed);
    let app = create_test_app(stub.clone());

    let requests = (0..5).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { speak(&app, "together").await })
    });
    let results = futures::future::join_all(requests).await;

    let mut audio = Vec::new();
    for result in results {
        let (status, json) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        audio.push(json["audio"].as_str().unwrap().to_string());
    }
    audio.dedup();
    assert_eq!(audio.len(), 1);
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_speak_capacity_evicts_least_recently_used() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_app(stub.clone(), 2, Duration::from_secs(5));

    speak(&app, "A").await;
    speak(&app, "B").await;
    speak(&app, "A").await; // hit, A becomes most recent
    speak(&app, "C").await; // evicts B
    assert_eq!(stub.calls(), 3);

    speak(&app, "A").await;
    assert_eq!(stub.calls(), 3, "A should still be cached");

    speak(&app, "B").await;
    assert_eq!(stub.calls(), 4, "B should have been evicted");

    let json = stats(&app).await;
    assert_eq!(json["total_entries"], 2);
    assert_eq!(json["capacity"], 2);
}

// == STATS / HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_initial() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_test_app(stub);

    let json = stats(&app).await;

    assert_eq!(json["hits"], 0);
    assert_eq!(json["misses"], 0);
    assert_eq!(json["evictions"], 0);
    assert_eq!(json["expirations"], 0);
    assert_eq!(json["ttl_secs"], 300);
    assert_eq!(json["in_flight"], 0);
    assert_eq!(json["hit_rate"], 0.0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let stub = StubSynthesizer::new(Duration::ZERO, Behavior::Succeed);
    let app = create_test_app(stub);

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
