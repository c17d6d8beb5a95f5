#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sceneqa_api::config::ServerConfig;
use sceneqa_api::router::build_app_router;
use sceneqa_api::settings::SettingsStore;
use sceneqa_api::state::{AppState, ReviewSession};
use sceneqa_core::regeneration::{
    GenerationService, RegenerationCoordinator, RegenerationRequest, ServiceError,
};
use sceneqa_events::EventBus;
use tempfile::TempDir;
use tokio::sync::{Notify, RwLock};
use tower::ServiceExt;

pub const DEFAULT_BACKEND: &str = "http://generator.test:8000";
const BOUNDARY: &str = "sceneqa-test-boundary";

/// Build a test `ServerConfig` rooted in `dir`.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 10 * 1024 * 1024,
        media_dir: dir.path().join("media"),
        settings_path: dir.path().join("settings.json"),
        default_backend_url: DEFAULT_BACKEND.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Stub generation backend
// ---------------------------------------------------------------------------

/// Generation backend double. Returns `https://gen.test/regen-{n}.png`,
/// fails while `fail` is set, and blocks on `gate` when one is installed.
#[derive(Default)]
pub struct StubGenerator {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    pub gate: Option<Notify>,
    pub requests: Mutex<Vec<RegenerationRequest>>,
}

impl StubGenerator {
    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn last_request(&self) -> Option<RegenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationService for StubGenerator {
    async fn generate(&self, request: &RegenerationRequest) -> Result<String, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err("generator exploded".into());
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://gen.test/regen-{n}.png"))
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub generator: Arc<StubGenerator>,
    // Held so the media and settings directories outlive the test.
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_generator(StubGenerator::default()).await
    }

    /// Build the full application router with all middleware layers via
    /// [`build_app_router`], backed by `generator`.
    pub async fn with_generator(generator: StubGenerator) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let generator = Arc::new(generator);

        let service: Arc<dyn GenerationService> = generator.clone();
        let settings =
            SettingsStore::load(&config.settings_path, &config.default_backend_url).await;

        let state = AppState {
            config: Arc::new(config.clone()),
            session: Arc::new(RwLock::new(ReviewSession::new())),
            settings: Arc::new(settings),
            regeneration: Arc::new(RegenerationCoordinator::new(service)),
            event_bus: Arc::new(EventBus::default()),
        };

        Self {
            router: build_app_router(state.clone(), &config),
            state,
            generator,
            dir,
        }
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Import `names` as tiny fake PNGs and return the created item ids.
    pub async fn import(&self, names: &[&str]) -> Vec<i64> {
        let files: Vec<(&str, &[u8])> = names.iter().map(|n| (*n, b"png".as_slice())).collect();
        let response = send(self.app(), multipart_request("/api/v1/review/import", &files)).await;
        assert_eq!(response.status(), 201);
        let json = body_json(response).await;
        json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_i64().unwrap())
            .collect()
    }

    pub async fn load_dataset(&self, labels: &[&str]) -> serde_json::Value {
        let records: Vec<_> = labels
            .iter()
            .map(|l| serde_json::json!({ "outputAi": l }))
            .collect();
        let response = post_raw(
            self.app(),
            "/api/v1/review/dataset",
            serde_json::to_string(&records).unwrap(),
        )
        .await;
        assert_eq!(response.status(), 200);
        body_json(response).await
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, body)).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// `multipart/form-data` request with one `files` part per entry.
pub fn multipart_request(uri: &str, files: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, bytes) in files {
        body.extend_from_slice(&multipart_part(name, bytes));
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    multipart_raw(uri, body)
}

/// Boundary line, headers and bytes of a single `files` part, without the
/// trailing line break.
pub fn multipart_part(name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut part = format!("--{BOUNDARY}\r\n").into_bytes();
    part.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n")
            .as_bytes(),
    );
    part.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    part.extend_from_slice(bytes);
    part
}

/// `multipart/form-data` request carrying `body` as-is.
pub fn multipart_raw(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
