mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, io::ErrorKind, path::Path};
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let mut config = load_from(&config_path).await?;
    config.apply_overrides(|key| env::var(key).ok());
    config.validate()?;

    Ok(config)
}

/// Reads a YAML config file. A missing file yields the defaults so that the
/// service can be configured from the environment alone.
pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(config_str) => Ok(serde_yaml::from_str(&config_str)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(
                "No configuration file at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

const STORAGE_ENV_KEYS: [&str; 6] = [
    "APPWRITE_ENDPOINT",
    "APPWRITE_PROJECT_ID",
    "APPWRITE_API_KEY",
    "APPWRITE_BUCKET_ID",
    "APPWRITE_DATABASE_ID",
    "APPWRITE_COLLECTION_ID",
];

fn storage_field<'a>(storage: &'a mut StorageConfig, key: &str) -> Option<&'a mut String> {
    match key {
        "APPWRITE_ENDPOINT" => Some(&mut storage.endpoint),
        "APPWRITE_PROJECT_ID" => Some(&mut storage.project_id),
        "APPWRITE_API_KEY" => Some(&mut storage.api_key),
        "APPWRITE_BUCKET_ID" => Some(&mut storage.bucket_id),
        "APPWRITE_DATABASE_ID" => Some(&mut storage.database_id),
        "APPWRITE_COLLECTION_ID" => Some(&mut storage.collection_id),
        _ => None,
    }
}

impl Config {
    /// Applies environment overrides through `lookup`. Any `APPWRITE_*`
    /// variable switches the storage section on.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = lookup("REPLICATE_API_TOKEN") {
            self.inference.api_token = token;
        }
        if let Some(base_url) = lookup("REPLICATE_API_BASE") {
            self.inference.base_url = base_url.trim().trim_end_matches('/').to_string();
        }

        for key in STORAGE_ENV_KEYS {
            if let Some(value) = lookup(key) {
                let storage = self.storage.get_or_insert_with(StorageConfig::default);
                if let Some(field) = storage_field(storage, key) {
                    *field = value;
                }
            }
        }
    }

    /// Fails with every missing key at once, named by its environment variable.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.inference.api_token.trim().is_empty() {
            missing.push("REPLICATE_API_TOKEN");
        }

        if let Some(storage) = &self.storage {
            let mut required = vec![
                ("APPWRITE_ENDPOINT", &storage.endpoint),
                ("APPWRITE_PROJECT_ID", &storage.project_id),
                ("APPWRITE_API_KEY", &storage.api_key),
                ("APPWRITE_DATABASE_ID", &storage.database_id),
                ("APPWRITE_COLLECTION_ID", &storage.collection_id),
            ];
            if storage.mode == PersistMode::File {
                required.insert(3, ("APPWRITE_BUCKET_ID", &storage.bucket_id));
            }
            missing.extend(
                required
                    .into_iter()
                    .filter(|(_, value)| value.trim().is_empty())
                    .map(|(key, _)| key),
            );
        }

        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        if self.inference.enabled_types.is_empty() {
            return Err(Error::config("inference.enabled_types must not be empty"));
        }

        if self.inference.poll_interval_ms == 0 {
            return Err(Error::config("inference.poll_interval_ms must be positive"));
        }

        if self.inference.request_timeout_secs == 0
            || self.storage.as_ref().is_some_and(|s| s.request_timeout_secs == 0)
        {
            return Err(Error::config("request_timeout_secs must be positive"));
        }

        Ok(())
    }
}
