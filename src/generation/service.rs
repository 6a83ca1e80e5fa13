use super::{
    Generated, GenerationError, GenerationRequest, MediaType, normalize::normalize,
    params::build_input,
};
use crate::{
    Error, Result,
    config::{Config, InferenceConfig, InferenceMode, ModelsConfig},
    inference::{InferenceRunner, PollPolicy, ReplicateClient, wait_for_completion},
    storage::{AppwriteStore, PersistenceSink},
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info};

/// The request pipeline: build input, run the model, normalize, persist.
pub struct GenerationService {
    runner: Arc<dyn InferenceRunner>,
    sink: Option<PersistenceSink>,
    models: ModelsConfig,
    mode: InferenceMode,
    poll: PollPolicy,
    enabled_types: Vec<MediaType>,
}

impl GenerationService {
    pub fn new(
        config: &InferenceConfig,
        runner: Arc<dyn InferenceRunner>,
        sink: Option<PersistenceSink>,
    ) -> Self {
        Self {
            runner,
            sink,
            models: config.models.clone(),
            mode: config.mode,
            poll: PollPolicy::from_config(config),
            enabled_types: config.enabled_types.clone(),
        }
    }

    /// Wires the Replicate and Appwrite clients described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let runner = Arc::new(ReplicateClient::new(&config.inference));
        let sink = config.storage.as_ref().map(|storage| {
            info!("Persisting images to Appwrite in {:?} mode", storage.mode);
            PersistenceSink::new(Arc::new(AppwriteStore::new(storage)), storage.mode)
                .with_timeout(Duration::from_secs(storage.request_timeout_secs))
        });

        Self::new(&config.inference, runner, sink)
    }

    pub fn enabled_types(&self) -> &[MediaType] {
        &self.enabled_types
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<Generated, GenerationError> {
        let media_type = request.media_type;

        let output = self.infer(request).await.map_err(|e| {
            error!("Error running model for {} request: {}", media_type, e);
            GenerationError::Inference(e)
        })?;

        let mut response = normalize(media_type, output);
        debug!("Normalized {} output: {}", media_type, response);

        if media_type == MediaType::Image {
            if let Some(sink) = &self.sink {
                response = self
                    .persist(sink, response, &request.prompt)
                    .await
                    .map_err(|e| {
                        error!("Error processing image: {}", e);
                        GenerationError::persistence(sink.mode(), e)
                    })?;
            }
        }

        Ok(Generated {
            media_type,
            response,
        })
    }

    async fn infer(&self, request: &GenerationRequest) -> Result<Value> {
        let model = self.models.for_type(request.media_type);
        let input = build_input(request.media_type, &request.prompt);

        info!("Requesting {} from model {}", request.media_type, model);

        match self.mode {
            InferenceMode::Run => self.runner.run(model, input).await,
            InferenceMode::Poll => {
                let job = self.runner.create(model, input).await?;
                info!("Created job {} ({})", job.id, job.status.as_str());
                wait_for_completion(self.runner.as_ref(), job, &self.poll).await
            }
        }
    }

    async fn persist(&self, sink: &PersistenceSink, image: Value, prompt: &str) -> Result<Value> {
        let url = image
            .as_str()
            .ok_or_else(|| Error::storage("Model returned no image URL"))?
            .to_string();

        let persisted = sink.persist(&url, prompt).await?;
        Ok(persisted.into_response(image))
    }
}
