use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use async_trait::async_trait;
use crate::backend::{Logits, TokenClassifier};
use crate::communication::{Outcome, Request};
use crate::core::batch::{fail_batch, panic_message};
use crate::core::handler::BatchHandler;
use crate::error::BatchError;
use crate::labels::Label;
use crate::span::{merge_spans, spans_from_row};
use crate::tokenizer::{EncodedBatch, Tokenize};

/// A [`BatchHandler`] that runs a token classifier over a batch of queries
/// and turns each output row into entities.
///
/// # Type Parameters
///
/// * `T` - The tokenizer, implementing [`Tokenize`]
/// * `M` - The inference engine, implementing [`TokenClassifier`]
pub struct NerHandler<T, M> {
    /// Tokenizer shared by every batch
    pub(crate) tokenizer: T,

    /// The model that labels sub-tokens
    pub(crate) model: M,

    /// Truncation length handed to the tokenizer
    pub(crate) max_length: usize,
}

impl<T, M> NerHandler<T, M>
where
    T: Tokenize,
    M: TokenClassifier,
{
    pub fn new(tokenizer: T, model: M, max_length: usize) -> Self {
        Self { tokenizer, model, max_length }
    }

    /// Tokenizes `texts` and checks that one row came back per text.
    pub(crate) fn encode(&self, texts: &[String], max_length: usize) -> Result<EncodedBatch, BatchError> {
        let batch = self
            .tokenizer
            .tokenize(texts, max_length)
            .map_err(BatchError::Tokenizer)?;
        if batch.rows() != texts.len() {
            return Err(BatchError::Shape(format!(
                "tokenizer returned {} rows for {} texts",
                batch.rows(),
                texts.len()
            )));
        }
        Ok(batch)
    }

    /// Runs the model and checks the logits line up with the batch.
    pub(crate) async fn infer(&self, batch: &EncodedBatch) -> Result<M::Logits, BatchError> {
        let logits = self.model.forward(batch).await.map_err(BatchError::Inference)?;
        let expected = vec![batch.rows(), batch.seq_len(), Label::COUNT];
        let shape = logits.shape();
        if shape != expected {
            return Err(BatchError::Shape(format!(
                "logits shape {shape:?}, expected {expected:?}"
            )));
        }
        Ok(logits)
    }
}

#[async_trait]
impl<T, M> BatchHandler for NerHandler<T, M>
where
    T: Tokenize,
    M: TokenClassifier,
{
    type ModelInput = EncodedBatch;
    type ModelOutput = M::Logits;

    async fn make_batch_input(&self, requests: &[Request]) -> Result<EncodedBatch, BatchError> {
        let texts: Vec<String> = requests.iter().map(|r| r.text().to_string()).collect();
        self.encode(&texts, self.max_length)
    }

    async fn forward(&self, model_input: &EncodedBatch) -> Result<M::Logits, BatchError> {
        self.infer(model_input).await
    }

    /// Resolves request `i` from row `i` of the logits and offsets.
    ///
    /// A row that cannot be decoded, or panics while decoding, fails only its
    /// own request. Logits that cannot be reduced at all, including a panic in
    /// [`Logits::argmax`], fail the whole batch.
    fn handle_outputs(&self, requests: Vec<Request>, model_input: EncodedBatch, output: M::Logits) {
        let reduced = panic::catch_unwind(AssertUnwindSafe(|| output.argmax()));
        let label_ids = match reduced {
            Ok(Ok(label_ids)) if label_ids.len() == requests.len() => label_ids,
            Ok(Ok(label_ids)) => {
                let error = BatchError::Shape(format!(
                    "{} logit rows for {} requests",
                    label_ids.len(),
                    requests.len()
                ));
                return fail_batch(requests, error);
            }
            Ok(Err(error)) => return fail_batch(requests, BatchError::Inference(error)),
            Err(panic) => return fail_batch(requests, BatchError::Panicked(panic_message(panic.as_ref()))),
        };

        let rows = requests.into_iter().zip(label_ids).zip(model_input.offsets());
        for ((request, row_labels), row_offsets) in rows {
            request.resolve(decode_row(&row_labels, row_offsets));
        }
    }
}

fn decode_row(row_labels: &[usize], row_offsets: &[(usize, usize)]) -> Outcome {
    let decoded = panic::catch_unwind(|| {
        spans_from_row(row_labels, row_offsets).map(|spans| merge_spans(&spans))
    });
    match decoded {
        Ok(outcome) => outcome.map_err(Arc::new),
        Err(panic) => Err(Arc::new(BatchError::Panicked(panic_message(panic.as_ref())))),
    }
}
