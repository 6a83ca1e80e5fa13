use super::{Job, PollPolicy, wait_for_completion};
use crate::{Error, Result, config::InferenceConfig};
use async_trait::async_trait;
use reqwest::{Response, header};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait InferenceRunner: Send + Sync {
    /// Runs `model` to completion and returns its raw output.
    async fn run(&self, model: &str, input: Value) -> Result<Value>;

    /// Starts an asynchronous job without waiting for it.
    async fn create(&self, model: &str, input: Value) -> Result<Job>;

    async fn get_job(&self, id: &str) -> Result<Job>;
}

/// Client for the Replicate predictions API.
pub struct ReplicateClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    request_timeout: Duration,
    poll: PollPolicy,
}

impl ReplicateClient {
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            poll: PollPolicy::from_config(config),
        }
    }

    /// `owner/name:version` targets a pinned version, `owner/name` the
    /// model's latest deployment.
    fn prediction_target(&self, model: &str, input: Value) -> (String, Value) {
        match model.split_once(':') {
            Some((_, version)) => (
                format!("{}/predictions", self.base_url),
                json!({ "version": version, "input": input }),
            ),
            None => (
                format!("{}/models/{}/predictions", self.base_url, model),
                json!({ "input": input }),
            ),
        }
    }

    async fn start(&self, model: &str, input: Value, wait: bool) -> Result<Job> {
        let (url, body) = self.prediction_target(model, input);

        debug!("Creating prediction for model {} at {}", model, url);

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .timeout(self.request_timeout)
            .json(&body);
        if wait {
            request = request.header("Prefer", "wait");
        }

        let response = request.send().await.map_err(|e| {
            Error::inference(format!("Failed to send prediction request: {}", e))
        })?;

        let job = parse_job(response).await?;
        debug!("Prediction {} created with status {}", job.id, job.status.as_str());
        Ok(job)
    }
}

async fn parse_job(response: Response) -> Result<Job> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::inference(format!(
            "Replicate returned {}: {}",
            status, body
        )));
    }

    response
        .json::<Job>()
        .await
        .map_err(|e| Error::inference(format!("Failed to parse prediction: {}", e)))
}

#[async_trait]
impl InferenceRunner for ReplicateClient {
    async fn run(&self, model: &str, input: Value) -> Result<Value> {
        let job = self.start(model, input, true).await?;
        wait_for_completion(self, job, &self.poll).await
    }

    async fn create(&self, model: &str, input: Value) -> Result<Job> {
        self.start(model, input, false).await
    }

    async fn get_job(&self, id: &str) -> Result<Job> {
        let url = format!("{}/predictions/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .timeout(self.request_timeout)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::inference(format!("Failed to fetch prediction {}: {}", id, e)))?;

        parse_job(response).await
    }
}
