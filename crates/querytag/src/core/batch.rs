use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, warn};
use crate::communication::Request;
use crate::config::{BatcherConfig, WaitPolicy};
use crate::error::BatchError;
use super::handler::BatchHandler;
use super::queue::RequestQueue;

/// Runs batches until the queue closes or `running` is cleared.
///
/// Each iteration forms one batch with [`collect_batch`] and runs it with
/// [`dispatch_batch`]. A failed batch never ends the loop.
pub async fn batching_loop<BH: BatchHandler>(
    handler: &BH,
    running: Arc<AtomicBool>,
    queue: Arc<RequestQueue>,
    config: BatcherConfig,
) {
    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let Some(batch) = collect_batch(&queue, config.batch_size, config.max_wait(), config.wait_policy).await
        else {
            break;
        };
        dispatch_batch(handler, batch).await;
    }
    debug!("batching loop stopped");
}

/// Forms the next batch.
///
/// Waits without limit for a first request, then keeps admitting requests
/// until the batch holds `batch_size` of them or the wait for the next one
/// runs out. Under [`WaitPolicy::PerItem`] every admitted request restarts the
/// `max_wait` timer; under [`WaitPolicy::Deadline`] the timer starts once,
/// when the first request is admitted.
///
/// Returns `None` only when the queue is closed and empty.
pub async fn collect_batch(
    queue: &RequestQueue,
    batch_size: usize,
    max_wait: Duration,
    policy: WaitPolicy,
) -> Option<Vec<Request>> {
    let first = queue.pop(None).await?;
    let started = Instant::now();

    let mut batch = Vec::with_capacity(batch_size);
    batch.push(first);
    while batch.len() < batch_size {
        let deadline = match policy {
            WaitPolicy::PerItem => Instant::now() + max_wait,
            WaitPolicy::Deadline => started + max_wait,
        };
        match queue.pop(Some(deadline)).await {
            Some(request) => batch.push(request),
            None => break,
        }
    }
    Some(batch)
}

/// Runs one batch through the handler and resolves every request in it.
///
/// Errors and panics from building the input or running the model resolve
/// every member of the batch with the same [`BatchError`]. A panic while
/// distributing outputs drops the requests not yet resolved, which closes
/// their handles.
pub async fn dispatch_batch<BH: BatchHandler>(handler: &BH, batch: Vec<Request>) {
    let size = batch.len();
    let oldest_wait = batch.first().map(|r| r.arrival().elapsed()).unwrap_or_default();
    debug!(size, oldest_wait_ms = oldest_wait.as_millis() as u64, "dispatching batch");

    let ran = AssertUnwindSafe(run_model(handler, &batch)).catch_unwind().await;
    let (model_input, output) = match ran {
        Ok(Ok(ran)) => ran,
        Ok(Err(error)) => return fail_batch(batch, error),
        Err(panic) => return fail_batch(batch, BatchError::Panicked(panic_message(panic.as_ref()))),
    };

    let distributed = std::panic::catch_unwind(AssertUnwindSafe(|| {
        handler.handle_outputs(batch, model_input, output)
    }));
    if let Err(panic) = distributed {
        warn!(size, panic = %panic_message(panic.as_ref()), "output distribution panicked");
    }
}

async fn run_model<BH: BatchHandler>(
    handler: &BH,
    batch: &[Request],
) -> Result<(BH::ModelInput, BH::ModelOutput), BatchError> {
    let model_input = handler.make_batch_input(batch).await?;
    let output = handler.forward(&model_input).await?;
    Ok((model_input, output))
}

pub(crate) fn fail_batch(batch: Vec<Request>, error: BatchError) {
    warn!(size = batch.len(), error = %error, "batch failed");
    let error = Arc::new(error);
    for request in batch {
        request.fail(error.clone());
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
