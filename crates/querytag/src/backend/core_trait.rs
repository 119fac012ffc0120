use async_trait::async_trait;
use crate::error::BoxError;
use crate::tokenizer::EncodedBatch;

/// A label-logit tensor of shape `(batch, sub-tokens, labels)`.
///
/// Any tensor type can back the service as long as it can report its shape
/// and reduce its label dimension to the index of the highest score.
pub trait Logits: Send + Sync + 'static {
    /// Return the shape of this tensor
    fn shape(&self) -> Vec<usize>;

    /// Index of the highest-scoring label for every `(batch, sub-token)` position.
    ///
    /// The outer vector has one entry per batch row, each with one label id
    /// per sub-token position.
    fn argmax(&self) -> Result<Vec<Vec<usize>>, BoxError>;
}

/// The inference engine contract.
///
/// Given a padded batch, produce logits whose batch and sub-token axes line up
/// with the batch's rows and positions.
///
/// # Example
///
/// ```ignore
/// use querytag::backend::{DenseLogits, TokenClassifier};
/// use querytag::error::BoxError;
/// use querytag::tokenizer::EncodedBatch;
/// use async_trait::async_trait;
///
/// struct AlwaysOutside;
///
/// #[async_trait]
/// impl TokenClassifier for AlwaysOutside {
///     type Logits = DenseLogits;
///
///     async fn forward(&self, batch: &EncodedBatch) -> Result<DenseLogits, BoxError> {
///         let (rows, seq) = (batch.rows(), batch.seq_len());
///         let mut data = vec![0.0; rows * seq * 9];
///         data.iter_mut().step_by(9).for_each(|score| *score = 1.0);
///         Ok(DenseLogits::new(data, [rows, seq, 9])?)
///     }
/// }
/// ```
#[async_trait]
pub trait TokenClassifier: Send + Sync + 'static {
    type Logits: Logits;

    /// Runs the model on one padded batch.
    async fn forward(&self, batch: &EncodedBatch) -> Result<Self::Logits, BoxError>;
}
