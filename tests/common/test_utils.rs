use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use prompt_relay::{
    config::{InferenceConfig, InferenceMode, StorageConfig},
    generation::GenerationService,
    inference::InferenceRunner,
    server::{self, AppState},
    storage::PersistenceSink,
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

/// Inference settings with a fast poll interval
pub fn create_test_inference_config(mode: InferenceMode) -> InferenceConfig {
    InferenceConfig {
        api_token: "r8_test".to_string(),
        mode,
        poll_interval_ms: 1,
        max_wait_secs: Some(5),
        request_timeout_secs: 1,
        ..InferenceConfig::default()
    }
}

/// Storage settings pointing at `endpoint`
pub fn create_test_storage_config(endpoint: &str) -> StorageConfig {
    StorageConfig {
        endpoint: endpoint.to_string(),
        project_id: "test-project".to_string(),
        api_key: "test-key".to_string(),
        bucket_id: "images".to_string(),
        database_id: "main".to_string(),
        collection_id: "generations".to_string(),
        ..StorageConfig::default()
    }
}

pub fn create_test_app(
    config: &InferenceConfig,
    runner: Arc<dyn InferenceRunner>,
    sink: Option<PersistenceSink>,
    static_dir: &Path,
) -> Router {
    let service = GenerationService::new(config, runner, sink);
    server::router(AppState {
        service: Arc::new(service),
        static_dir: static_dir.to_path_buf(),
    })
}

/// Create a temporary directory holding an `index.html`
pub fn create_static_dir(html: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    std::fs::write(dir.path().join("index.html"), html).expect("Failed to write index.html");
    dir
}

pub fn json_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends `request` and decodes the JSON response body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Number of entries left in `dir`
pub fn leftover_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
