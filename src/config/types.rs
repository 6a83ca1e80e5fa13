use crate::generation::MediaType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub mode: InferenceMode,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// `None` waits for as long as the job keeps running.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: Option<u64>,
    /// Upper bound for a single HTTP call to the inference API.
    #[serde(default = "default_inference_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_enabled_types")]
    pub enabled_types: Vec<MediaType>,
    #[serde(default)]
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    /// A single blocking call that returns the finished output.
    #[default]
    Run,
    /// Create a job, then poll it until it settles.
    Poll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_image_model")]
    pub image: String,
    #[serde(default = "default_text_model")]
    pub text: String,
    #[serde(default = "default_audio_model")]
    pub audio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub mode: PersistMode,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub bucket_id: String,
    #[serde(default)]
    pub database_id: String,
    #[serde(default)]
    pub collection_id: String,
    /// Covers the image download as well as each Appwrite call.
    #[serde(default = "default_storage_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// Upload the image as a file and record its id next to the prompt.
    #[default]
    File,
    /// Store the image base64-encoded inside the document itself.
    Inline,
}

impl ModelsConfig {
    pub fn for_type(&self, media_type: MediaType) -> &str {
        match media_type {
            MediaType::Image => &self.image,
            MediaType::Text => &self.text,
            MediaType::Audio => &self.audio,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_base_url(),
            api_token: String::new(),
            mode: InferenceMode::default(),
            poll_interval_ms: default_poll_interval_ms(),
            max_wait_secs: default_max_wait_secs(),
            request_timeout_secs: default_inference_timeout_secs(),
            enabled_types: default_enabled_types(),
            models: ModelsConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: PersistMode::default(),
            endpoint: String::new(),
            project_id: String::new(),
            api_key: String::new(),
            bucket_id: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
            request_timeout_secs: default_storage_timeout_secs(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            image: default_image_model(),
            text: default_text_model(),
            audio: default_audio_model(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_inference_base_url() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_wait_secs() -> Option<u64> {
    Some(300)
}

// `Prefer: wait` holds a prediction request open for up to a minute.
fn default_inference_timeout_secs() -> u64 {
    90
}

fn default_storage_timeout_secs() -> u64 {
    60
}

fn default_enabled_types() -> Vec<MediaType> {
    vec![MediaType::Image, MediaType::Text, MediaType::Audio]
}

fn default_image_model() -> String {
    "konieshadow/fooocus-api:fda927242b1db6affa1ece4f54c37f19b964666bf23b0d06ae2439067cd344a4"
        .to_string()
}

fn default_text_model() -> String {
    "meta/llama-2-70b-chat".to_string()
}

fn default_audio_model() -> String {
    "meta/musicgen:b05b1dff1d8c6dc63d14b0cdb42135378dcb87f6373b0d3d341ede46e59e2b38".to_string()
}
