use std::sync::Arc;
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{error, info, warn};
use crate::backend::TokenClassifier;
use crate::communication::Request;
use crate::config::BatcherConfig;
use crate::core::batch::batching_loop;
use crate::core::queue::RequestQueue;
use crate::core::worker::BatchWorkerHandle;
use crate::error::{Error, Result};
use crate::span::Entity;
use crate::tokenizer::Tokenize;
use crate::tracker::{ConcurrencySnapshot, ConcurrencyTracker};
use super::core_trait::EntityExtractor;
use super::handler::NerHandler;

/// Trims and lowercases an inbound query.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The request gate in front of the batching loop.
///
/// Construction warms the model up and only then starts the background
/// batching task, so no request is queued before the model is known to work.
/// Dropping the service stops the task and closes every request still queued.
pub struct NerBatchInference {
    queue: Arc<RequestQueue>,
    tracker: ConcurrencyTracker,
    config: BatcherConfig,
    handle: BatchWorkerHandle,
}

impl NerBatchInference {
    /// Validates `config`, runs the warmup request and spawns the batching task.
    ///
    /// Must be called from within a Tokio runtime. A failed warmup returns
    /// [`Error::Startup`] and nothing is spawned.
    pub async fn new<T, M>(tokenizer: T, model: M, config: BatcherConfig) -> Result<Self>
    where
        T: Tokenize,
        M: TokenClassifier,
    {
        config.validate()?;

        let handler = NerHandler::new(tokenizer, model, config.max_len);
        if let Err(warmup_error) = handler.warmup(&config.warmup_text, config.warmup_max_length).await {
            error!(error = %warmup_error, "warmup failed, refusing to start");
            return Err(Error::Startup(warmup_error));
        }

        let queue = Arc::new(RequestQueue::new());
        let handle = BatchWorkerHandle::new(queue.clone(), {
            let config = config.clone();
            move |running, queue| {
                tokio::spawn(async move {
                    batching_loop(&handler, running, queue, config).await;
                })
            }
        });

        info!(
            batch_size = config.batch_size,
            max_wait_ms = config.max_wait_ms,
            max_len = config.max_len,
            wait_policy = ?config.wait_policy,
            "batching started"
        );
        Ok(Self {
            queue,
            tracker: ConcurrencyTracker::new(),
            config,
            handle,
        })
    }

    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Requests currently in flight and the most seen at once.
    pub fn concurrency(&self) -> ConcurrencySnapshot {
        self.tracker.snapshot()
    }

    /// Requests waiting to be batched.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Stops the batching task. Queued and later requests fail with [`Error::Closed`].
    pub fn shutdown(&mut self) {
        self.handle.shutdown();
    }

    /// Normalizes `text` and applies the length limit.
    ///
    /// `Ok(None)` means there is nothing to extract from.
    fn admit(&self, text: &str) -> Result<Option<String>> {
        let text = normalize(text);
        if text.is_empty() {
            return Ok(None);
        }
        let len = text.chars().count();
        if len > self.config.max_len {
            return Err(Error::TooLong { len, max: self.config.max_len });
        }
        Ok(Some(text))
    }
}

#[async_trait]
impl EntityExtractor for NerBatchInference {
    /// Queues the text and waits for its batch.
    ///
    /// This method:
    /// 1. Normalizes and validates the text, answering empty input directly
    /// 2. Counts the request in the concurrency tracker
    /// 3. Queues a request with a fresh outcome handle
    /// 4. Waits for the batching task to resolve the handle
    async fn predict(&self, text: &str) -> Result<Vec<Entity>> {
        let Some(text) = self.admit(text)? else {
            return Ok(vec![]);
        };

        let _in_flight = self.tracker.enter();
        let (request, pending) = Request::new(text.clone());
        let request_id = request.id();
        let arrival: Instant = request.arrival();
        self.queue.push(request).map_err(|_| Error::Closed)?;

        let result = pending.await;
        let elapsed_ms = arrival.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(entities) => info!(
                %request_id,
                input = %text,
                entities = entities.len(),
                elapsed_ms,
                "predicted"
            ),
            Err(predict_error) => warn!(
                %request_id,
                input = %text,
                error = %predict_error,
                elapsed_ms,
                "prediction failed"
            ),
        }
        result
    }
}
