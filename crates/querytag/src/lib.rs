//! # Querytag
//!
//! Named-entity extraction for short e-commerce search queries, served by
//! dynamically batching concurrent requests into single model invocations.
//!
//! ## Overview
//!
//! Callers submit one query at a time through [`EntityExtractor::predict`].
//! Requests are queued and a single background task assembles them into
//! batches bounded by size and wait time, runs the tokenizer and a token
//! classifier once per batch, merges each row's sub-token labels into entity
//! spans, and hands every caller exactly its own result. A batch that fails
//! fails only its own requests; the loop keeps serving.
//!
//! ## Architecture
//!
//! - [`core`]: the model-agnostic queue, batching loop and worker lifecycle
//! - [`ner`]: the service gate, warmup and the NER [`BatchHandler`](core::handler::BatchHandler)
//! - [`tokenizer`] and [`backend`]: contracts for the external tokenizer and
//!   inference engine
//! - [`span`]: BIO span merging
//! - [`tracker`]: in-flight request accounting
//!
//! ### Assumptions
//! Logits are reserved three dimensions:
//!  - The `0th` dimension is the batch dimension
//!  - The `1st` dimension is the sequence dimension
//!  - The `2nd` dimension is the label dimension, in [`Label`] order
//!
//! ## Features
//!
//! - **candle** - Reads logits from candle tensors
//! - **tokenizers** - Wraps a Hugging Face `tokenizer.json`

pub mod backend;
pub mod communication;
pub mod config;
pub mod core;
pub mod error;
pub mod labels;
pub mod ner;
pub mod span;
pub mod tokenizer;
pub mod tracker;

pub use config::{BatcherConfig, WaitPolicy};
pub use error::{BatchError, Error, Result};
pub use labels::{EntityKind, Label};
pub use ner::{EntityExtractor, NerBatchInference, PredictRequest};
pub use span::Entity;
