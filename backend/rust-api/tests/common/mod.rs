#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use quizcraft_api::config::Config;
use quizcraft_api::create_router;
use quizcraft_api::models::tutorial::Tutorial;
use quizcraft_api::services::cache::MemoryCache;
use quizcraft_api::services::content_service::{ContentProvider, ProviderError};
use quizcraft_api::services::generator_service::{
    parse_question_payload, GeneratorError, GeneratorRequest, QuestionGenerator, RawQuestion,
};
use quizcraft_api::services::AppState;

pub const KNOWN_TUTORIAL_ID: &str = "rust-ownership";

/// Three-question generator payload in the shape the live LLM emits.
pub const THREE_QUESTION_PAYLOAD: &str = r#"[
    {"question": "What does ownership mean?", "options": [
        {"id": "A", "text": "Every value has a single owner"},
        {"id": "B", "text": "Values are always copied"},
        {"id": "C", "text": "Memory is managed by a garbage collector"},
        {"id": "D", "text": "Values never move"}
    ], "correctAnswer": "A", "explanation": "Each value in Rust has exactly one owner."},
    {"question": "What happens when the owner goes out of scope?", "options": [
        {"id": "A", "text": "Nothing"},
        {"id": "B", "text": "The value is dropped"},
        {"id": "C", "text": "The program panics"},
        {"id": "D", "text": "The value leaks"}
    ], "correctAnswer": "B", "explanation": "Drop runs when the owner leaves scope."},
    {"question": "Which operation moves a value?", "options": [
        {"id": "A", "text": "Borrowing it"},
        {"id": "B", "text": "Printing it"},
        {"id": "C", "text": "Assigning it to another binding"},
        {"id": "D", "text": "Taking its length"}
    ], "correctAnswer": "C", "explanation": "Assignment transfers ownership for non-Copy types."}
]"#;

/// Serves one well-known tutorial; every other id is NotFound.
pub struct StaticContentProvider;

#[async_trait]
impl ContentProvider for StaticContentProvider {
    async fn fetch_tutorial(&self, tutorial_id: &str) -> Result<Tutorial, ProviderError> {
        if tutorial_id == KNOWN_TUTORIAL_ID {
            Ok(Tutorial {
                id: KNOWN_TUTORIAL_ID.to_string(),
                title: "Ownership in Rust".to_string(),
                content: "<h1>Ownership</h1><p>Every value in Rust has a single owner. When the \
                          owner goes out of scope the value is dropped. Assignment moves values \
                          between bindings unless the type is Copy, and borrowing lets code use \
                          a value without taking ownership of it.</p>"
                    .to_string(),
            })
        } else {
            Err(ProviderError::NotFound(tutorial_id.to_string()))
        }
    }
}

/// Content provider that is always down, for fallback-path tests.
pub struct UnreachableContentProvider;

#[async_trait]
impl ContentProvider for UnreachableContentProvider {
    async fn fetch_tutorial(&self, _tutorial_id: &str) -> Result<Tutorial, ProviderError> {
        Err(ProviderError::BadStatus(503))
    }
}

/// Generator that fails the way an unreachable LLM service does.
pub struct FailingGenerator;

#[async_trait]
impl QuestionGenerator for FailingGenerator {
    async fn generate(
        &self,
        _request: &GeneratorRequest,
    ) -> Result<Vec<RawQuestion>, GeneratorError> {
        Err(GeneratorError::BadStatus(503))
    }
}

/// Generator that replays a fixed payload and counts invocations, so tests
/// can observe cache hits and attempt-number cache busting.
pub struct ScriptedGenerator {
    payload: String,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(payload: &str) -> Self {
        Self {
            payload: payload.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _request: &GeneratorRequest,
    ) -> Result<Vec<RawQuestion>, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parse_question_payload(&self.payload)
    }
}

/// Builds the real router over a memory cache and the given fakes.
pub fn create_test_app(
    content: Arc<dyn ContentProvider>,
    generator: Arc<dyn QuestionGenerator>,
) -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(AppState {
        config: Config::for_tests(),
        cache: Arc::new(MemoryCache::new()),
        content,
        generator,
    });

    create_router(app_state)
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
