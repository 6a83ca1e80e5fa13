use super::{InferenceRunner, Job};
use crate::{Error, Result, config::InferenceConfig};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` keeps polling for as long as the job stays non-terminal.
    pub max_wait: Option<Duration>,
}

impl PollPolicy {
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_wait: config.max_wait_secs.map(Duration::from_secs),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Some(Duration::from_secs(300)),
        }
    }
}

/// Sleeps, refetches and repeats until `job` reaches a terminal status.
///
/// Returns the output of a succeeded job. Failed and canceled jobs become
/// [`Error::JobFailed`]. `policy.max_wait` bounds the whole loop, including a
/// fetch that never answers, and running past it becomes
/// [`Error::PollTimeout`]. Dropping the future stops the loop.
pub async fn wait_for_completion<R>(runner: &R, job: Job, policy: &PollPolicy) -> Result<Value>
where
    R: InferenceRunner + ?Sized,
{
    if job.status.is_terminal() {
        return job.into_output();
    }

    let Some(max_wait) = policy.max_wait else {
        return poll_until_terminal(runner, job, policy.interval).await;
    };

    let id = job.id.clone();
    let started = Instant::now();
    match timeout(max_wait, poll_until_terminal(runner, job, policy.interval)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Gave up on job {} after {:?}", id, started.elapsed());
            Err(Error::PollTimeout {
                id,
                waited_secs: started.elapsed().as_secs(),
            })
        }
    }
}

async fn poll_until_terminal<R>(runner: &R, mut job: Job, interval: Duration) -> Result<Value>
where
    R: InferenceRunner + ?Sized,
{
    let mut attempts = 0u32;

    while !job.status.is_terminal() {
        sleep(interval).await;
        job = runner.get_job(&job.id).await?;
        attempts += 1;

        debug!(
            "Job {} is {} after {} polls",
            job.id,
            job.status.as_str(),
            attempts
        );
    }

    job.into_output()
}
