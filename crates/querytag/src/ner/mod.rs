//! # Query entity extraction
//!
//! [`NerBatchInference`] is the service: it normalizes and validates each
//! query, queues it, and waits for the batching task to resolve it.
//! [`NerHandler`] is the model-specific half of a batch round, turning token
//! classifier output into merged [`Entity`](crate::span::Entity) lists.
mod batcher;
mod core_trait;
mod handler;
mod warmup;

pub use batcher::{normalize, NerBatchInference};
pub use core_trait::{EntityExtractor, PredictRequest};
pub use handler::NerHandler;
