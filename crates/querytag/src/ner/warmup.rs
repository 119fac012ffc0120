use std::panic::AssertUnwindSafe;
use futures::FutureExt;
use tokio::time::Instant;
use tracing::info;
use crate::backend::{Logits, TokenClassifier};
use crate::communication::Request;
use crate::core::batch::panic_message;
use crate::error::BatchError;
use crate::tokenizer::Tokenize;
use super::batcher::normalize;
use super::handler::NerHandler;

impl<T, M> NerHandler<T, M>
where
    T: Tokenize,
    M: TokenClassifier,
{
    /// Pushes one synthetic request through the tokenizer and the model,
    /// bypassing the queue.
    ///
    /// Succeeds only if the model returns logits over the full label set that
    /// reduce cleanly, so a missing or mismatched model is caught before the
    /// service takes traffic.
    pub async fn warmup(&self, text: &str, max_length: usize) -> Result<(), BatchError> {
        let started = Instant::now();
        let (request, _pending) = Request::new(normalize(text));

        let ran = AssertUnwindSafe(async {
            let batch = self.encode(&[request.text().to_string()], max_length)?;
            let logits = self.infer(&batch).await?;
            logits.argmax().map_err(BatchError::Inference)?;
            Ok::<usize, BatchError>(batch.seq_len())
        })
        .catch_unwind()
        .await;

        let positions = match ran {
            Ok(result) => result?,
            Err(panic) => return Err(BatchError::Panicked(panic_message(panic.as_ref()))),
        };
        info!(
            request_id = %request.id(),
            positions,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "warmup done"
        );
        Ok(())
    }
}
