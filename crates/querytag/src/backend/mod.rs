//! # Inference Backend
//!
//! The model itself is an external collaborator. This module defines the
//! contract it must meet ([`TokenClassifier`]) and the view of its output the
//! service needs ([`Logits`]), so batching stays independent of any particular
//! tensor library.
//!
//! ## Feature Flags
//!
//! - `candle`: implements [`Logits`] for candle's `Tensor` and adds
//!   [`candle::batch_tensors`] for feeding an [`EncodedBatch`](crate::tokenizer::EncodedBatch)
//!   to a candle model.
//!
//! [`DenseLogits`] is always available for engines that return plain buffers.

mod core_trait;
mod dense;

pub mod constant;

#[cfg_attr(docsrs, doc(cfg(feature = "candle")))]
#[cfg(feature = "candle")]
/// Candle tensor backend implementation.
///
/// This module is only available when the `candle` feature flag is enabled.
pub mod candle;

pub use core_trait::*;
pub use dense::DenseLogits;

#[cfg(test)]
/// Mock tokenizer and classifier.
///
/// Deterministic stand-ins for the external collaborators
pub(crate) mod mock_model;
