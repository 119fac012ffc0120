use async_trait::async_trait;
use crate::communication::Request;
use crate::error::BatchError;

/// Model-specific work the batching loop performs once per batch.
///
/// The loop calls [`make_batch_input`](BatchHandler::make_batch_input) and
/// [`forward`](BatchHandler::forward) inside its failure boundary; an error or
/// panic there fails every request in the batch. On success it hands the whole
/// batch to [`handle_outputs`](BatchHandler::handle_outputs), which must
/// resolve each request exactly once. Row `i` of the model input and output
/// belongs to `requests[i]`.
#[async_trait]
pub trait BatchHandler: Send + Sync + 'static {
    type ModelInput: Send + Sync;
    type ModelOutput: Send;

    /// Build the model input for the batch, one row per request, in order.
    async fn make_batch_input(&self, requests: &[Request]) -> Result<Self::ModelInput, BatchError>;

    /// Run the model forward pass.
    async fn forward(&self, model_input: &Self::ModelInput) -> Result<Self::ModelOutput, BatchError>;

    /// Route each output row back to the request that produced it.
    fn handle_outputs(
        &self,
        requests: Vec<Request>,
        model_input: Self::ModelInput,
        output: Self::ModelOutput,
    );
}
