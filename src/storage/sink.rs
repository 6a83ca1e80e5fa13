use super::{Artifact, ArtifactStore};
use crate::{Error, Result, config::PersistMode};
use base64::{Engine, engine::general_purpose::STANDARD};
use futures::StreamExt;
use serde_json::{Value, json};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const DEFAULT_FILE_NAME: &str = "image.jpg";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

impl PersistMode {
    /// Message returned to the caller when persisting in this mode fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::File => "Failed to process image",
            Self::Inline => "Failed to save image to Appwrite",
        }
    }
}

/// Where a persisted image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    File {
        file_id: String,
        document_id: String,
    },
    Inline {
        document_id: String,
    },
}

impl Persisted {
    /// Response body for the caller. File uploads report their ids, inline
    /// copies keep answering with the image URL.
    pub fn into_response(self, image_url: Value) -> Value {
        match self {
            Self::File {
                file_id,
                document_id,
            } => json!({ "fileId": file_id, "documentId": document_id }),
            Self::Inline { .. } => image_url,
        }
    }
}

/// Copies generated images from the inference host into the artifact store.
pub struct PersistenceSink {
    http: reqwest::Client,
    store: Arc<dyn ArtifactStore>,
    mode: PersistMode,
    scratch_dir: PathBuf,
    request_timeout: Duration,
}

struct Download {
    file_name: String,
    content_type: String,
    size: u64,
}

impl PersistenceSink {
    pub fn new(store: Arc<dyn ArtifactStore>, mode: PersistMode) -> Self {
        Self {
            http: reqwest::Client::new(),
            store,
            mode,
            scratch_dir: std::env::temp_dir(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bounds the whole image download, body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    pub async fn persist(&self, image_url: &str, prompt: &str) -> Result<Persisted> {
        match self.mode {
            PersistMode::File => self.persist_file(image_url, prompt).await,
            PersistMode::Inline => self.persist_inline(image_url).await,
        }
    }

    /// Download to a scratch file, upload it, then record `{fileId, prompt}`.
    /// The scratch file is removed when `scratch` drops, on every path. An
    /// upload is left in place if the document write fails.
    async fn persist_file(&self, image_url: &str, prompt: &str) -> Result<Persisted> {
        let scratch = tempfile::Builder::new()
            .prefix("prompt-relay-")
            .suffix(".img")
            .tempfile_in(&self.scratch_dir)?;

        debug!("Downloading {} to {}", image_url, scratch.path().display());
        let download = self.download_to(image_url, &scratch).await?;
        info!("Downloaded {} bytes from {}", download.size, image_url);

        let file_id = self
            .store
            .upload(Artifact {
                path: scratch.path().to_path_buf(),
                size: download.size,
                file_name: download.file_name,
                content_type: download.content_type,
            })
            .await?;
        info!("Image uploaded with file ID: {}", file_id);

        let document_id = self
            .store
            .record_metadata(json!({ "fileId": file_id, "prompt": prompt }))
            .await?;
        info!("File ID saved with document ID: {}", document_id);

        Ok(Persisted::File {
            file_id,
            document_id,
        })
    }

    async fn persist_inline(&self, image_url: &str) -> Result<Persisted> {
        let response = self.fetch(image_url).await?;
        let bytes = response.bytes().await?;
        let encoded = STANDARD.encode(&bytes);

        debug!(
            "Encoded {} bytes from {} as base64",
            bytes.len(),
            image_url
        );

        let document_id = self
            .store
            .record_metadata(json!({ "image": encoded }))
            .await?;
        info!("Image saved inline with document ID: {}", document_id);

        Ok(Persisted::Inline { document_id })
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::storage(format!(
                "Downloading {} failed with status {}",
                url, status
            )));
        }
        Ok(response)
    }

    async fn download_to(&self, url: &str, scratch: &NamedTempFile) -> Result<Download> {
        let response = self.fetch(url).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let mut file = tokio::fs::File::from_std(scratch.reopen()?);
        let mut stream = response.bytes_stream();
        let mut size = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(Download {
            file_name: file_name_from_url(url),
            content_type,
            size,
        })
    }
}

/// Last path segment of `url` when it looks like a file name.
fn file_name_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| Path::new(name).extension().is_some())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}
