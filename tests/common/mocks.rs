use async_trait::async_trait;
use prompt_relay::{
    Error, Result,
    inference::{InferenceRunner, Job, JobStatus},
    storage::{Artifact, ArtifactStore},
};
use serde_json::Value;
use std::sync::Mutex;

/// Mock inference runner for testing
#[derive(Debug, Default)]
pub struct MockRunner {
    pub outputs: Mutex<Vec<Value>>,
    pub jobs: Mutex<Vec<Job>>,
    pub calls: Mutex<Vec<(String, Value)>>,
    pub polls: Mutex<usize>,
    pub error: Option<String>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outputs handed out by `run`, in order.
    pub fn with_outputs(self, outputs: Vec<Value>) -> Self {
        *self.outputs.lock().unwrap() = outputs;
        self
    }

    /// Jobs handed out by `create` and then `get_job`. The last one repeats.
    pub fn with_jobs(self, jobs: Vec<Job>) -> Self {
        *self.jobs.lock().unwrap() = jobs;
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn get_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        *self.polls.lock().unwrap()
    }

    fn record(&self, model: &str, input: Value) -> Result<()> {
        self.calls.lock().unwrap().push((model.to_string(), input));
        match &self.error {
            Some(error) => Err(Error::inference(error.clone())),
            None => Ok(()),
        }
    }

    fn next_job(&self) -> Result<Job> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.len() {
            0 => Err(Error::inference("No more mock jobs available")),
            1 => Ok(jobs[0].clone()),
            _ => Ok(jobs.remove(0)),
        }
    }
}

#[async_trait]
impl InferenceRunner for MockRunner {
    async fn run(&self, model: &str, input: Value) -> Result<Value> {
        self.record(model, input)?;

        let mut outputs = self.outputs.lock().unwrap();
        if outputs.is_empty() {
            return Err(Error::inference("No more mock outputs available"));
        }
        Ok(outputs.remove(0))
    }

    async fn create(&self, model: &str, input: Value) -> Result<Job> {
        self.record(model, input)?;
        self.next_job()
    }

    async fn get_job(&self, _id: &str) -> Result<Job> {
        *self.polls.lock().unwrap() += 1;
        self.next_job()
    }
}

/// An upload captured by [`MockStore`], read back from its scratch file.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub bytes: Vec<u8>,
    pub size: u64,
    pub file_name: String,
    pub content_type: String,
}

/// Mock artifact store for testing
#[derive(Debug, Default)]
pub struct MockStore {
    pub uploads: Mutex<Vec<StoredFile>>,
    pub documents: Mutex<Vec<Value>>,
    pub upload_error: Option<String>,
    pub record_error: Option<String>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_error(mut self, error: &str) -> Self {
        self.upload_error = Some(error.to_string());
        self
    }

    pub fn with_record_error(mut self, error: &str) -> Self {
        self.record_error = Some(error.to_string());
        self
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn get_uploads(&self) -> Vec<StoredFile> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn get_documents(&self) -> Vec<Value> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MockStore {
    async fn upload(&self, artifact: Artifact) -> Result<String> {
        if let Some(ref error) = self.upload_error {
            return Err(Error::storage(error.clone()));
        }

        let bytes = tokio::fs::read(&artifact.path).await?;
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(StoredFile {
            bytes,
            size: artifact.size,
            file_name: artifact.file_name,
            content_type: artifact.content_type,
        });
        Ok(format!("file-{}", uploads.len()))
    }

    async fn record_metadata(&self, fields: Value) -> Result<String> {
        if let Some(ref error) = self.record_error {
            return Err(Error::storage(error.clone()));
        }

        let mut documents = self.documents.lock().unwrap();
        documents.push(fields);
        Ok(format!("doc-{}", documents.len()))
    }
}

// Helper functions for creating test data

pub fn create_mock_job(status: JobStatus, output: Value) -> Job {
    Job {
        id: "job-1".to_string(),
        status,
        output,
        error: None,
    }
}
