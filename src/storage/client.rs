use crate::{Error, Result, config::StorageConfig};
use async_trait::async_trait;
use reqwest::{
    RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde_json::{Value, json};
use std::{path::PathBuf, time::Duration};
use tracing::debug;

/// Lets the server pick the id of a new file or document.
pub const UNIQUE_ID: &str = "unique()";

/// A produced media file on disk, on its way to object storage.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: u64,
    pub file_name: String,
    pub content_type: String,
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores the file and returns its generated id.
    async fn upload(&self, artifact: Artifact) -> Result<String>;

    /// Creates a metadata document and returns its generated id.
    async fn record_metadata(&self, fields: Value) -> Result<String>;
}

/// Appwrite storage bucket plus database collection, over the REST API.
pub struct AppwriteStore {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    bucket_id: String,
    database_id: String,
    collection_id: String,
    request_timeout: Duration,
}

impl AppwriteStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            bucket_id: config.bucket_id.clone(),
            database_id: config.database_id.clone(),
            collection_id: config.collection_id.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .timeout(self.request_timeout)
    }
}

async fn created_id(response: Response, what: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::storage(format!(
            "Appwrite rejected {}: {} {}",
            what, status, body
        )));
    }

    let body: Value = response.json().await?;
    body.get("$id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::storage(format!("Appwrite {} response missing $id", what)))
}

#[async_trait]
impl ArtifactStore for AppwriteStore {
    async fn upload(&self, artifact: Artifact) -> Result<String> {
        let url = format!(
            "{}/storage/buckets/{}/files",
            self.endpoint, self.bucket_id
        );

        debug!(
            "Uploading {} ({} bytes) to bucket {}",
            artifact.file_name,
            artifact.size,
            self.bucket_id
        );

        let file = tokio::fs::File::open(&artifact.path).await?;
        let part = Part::stream_with_length(file, artifact.size)
            .file_name(artifact.file_name)
            .mime_str(&artifact.content_type)?;
        let form = Form::new().text("fileId", UNIQUE_ID).part("file", part);

        let response = self
            .authorized(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        created_id(response, "file upload").await
    }

    async fn record_metadata(&self, fields: Value) -> Result<String> {
        let url = format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, self.collection_id
        );

        debug!("Creating document in collection {}", self.collection_id);

        let response = self
            .authorized(self.client.post(&url))
            .json(&json!({ "documentId": UNIQUE_ID, "data": fields }))
            .send()
            .await?;

        created_id(response, "document").await
    }
}
