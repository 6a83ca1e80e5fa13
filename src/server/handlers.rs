use super::types::{ApiError, GenerateResponse};
use crate::generation::{GenerationError, GenerationRequest, GenerationService};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, Json},
};
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GenerationService>,
    pub static_dir: PathBuf,
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");
    info!("GET request received, serving {}", path.display());

    tokio::fs::read_to_string(&path).await.map(Html).map_err(|e| {
        error!("Failed to read static page {}: {}", path.display(), e);
        ApiError::new(StatusCode::NOT_FOUND, "Static page not available")
    })
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let body = parse_body(&headers, &body);
    info!("Received generation request: {}", body);

    let request = GenerationRequest::from_json(&body, state.service.enabled_types())
        .map_err(|e| {
            warn!("Rejected request: {}", e);
            GenerationError::from(e)
        })?;

    let generated = state.service.generate(&request).await?;

    info!("Completed {} request", generated.media_type);
    Ok(Json(GenerateResponse::from(generated)))
}

/// The request body as JSON. Anything that is not a JSON document sent as
/// `application/json` reads as `null`, so it fails validation like a body
/// without a prompt.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Value {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        warn!("Request body is not declared as application/json");
        return Value::Null;
    }

    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!("Request body is not valid JSON: {}", e);
        Value::Null
    })
}
