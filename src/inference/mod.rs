mod client;
mod poller;
mod types;

pub use client::{InferenceRunner, ReplicateClient};
pub use poller::{PollPolicy, wait_for_completion};
pub use types::{Job, JobStatus};
