use std::sync::Arc;
use thiserror::Error;

/// Error type returned by the external collaborators (tokenizer, inference engine).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single batch dispatch.
///
/// One `BatchError` is shared, behind an `Arc`, by every request that was a
/// member of the failed batch. Requests in other batches never observe it.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("tokenizer failed: {0}")]
    Tokenizer(#[source] BoxError),

    #[error("inference engine failed: {0}")]
    Inference(#[source] BoxError),

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("model produced label id {0} outside the label set")]
    UnknownLabel(usize),

    #[error("batch dispatch panicked: {0}")]
    Panicked(String),
}

/// Errors surfaced to callers of the service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("input too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("batch failed: {0}")]
    BatchFailure(#[source] Arc<BatchError>),

    #[error("warmup failed: {0}")]
    Startup(#[source] BatchError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("request queue is closed")]
    Closed,
}

impl From<config::ConfigError> for Error {
    fn from(value: config::ConfigError) -> Self {
        Error::Config(value.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
