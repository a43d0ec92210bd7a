use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to setup tracing: {0}")]
    SetupTracingError(String),
    #[error("Failed to load graph snapshot: {0}")]
    SnapshotError(String),
    #[error("Search failed: {0}")]
    SearchError(#[from] super::TraceError),
}
