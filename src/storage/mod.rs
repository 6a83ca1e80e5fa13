mod client;
mod sink;

pub use client::{AppwriteStore, Artifact, ArtifactStore, UNIQUE_ID};
pub use sink::{PersistenceSink, Persisted};
