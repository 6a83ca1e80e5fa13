use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

/// A remote inference job. The inference service owns its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Job {
    /// Output of a succeeded job; any other status is an error.
    pub fn into_output(self) -> Result<Value> {
        match self.status {
            JobStatus::Succeeded => Ok(self.output),
            status => {
                let reason = match self.error {
                    Some(Value::String(reason)) => reason,
                    Some(Value::Null) | None => "no error reported".to_string(),
                    Some(other) => other.to_string(),
                };
                Err(Error::JobFailed {
                    id: self.id,
                    status: status.as_str().to_string(),
                    reason,
                })
            }
        }
    }
}
