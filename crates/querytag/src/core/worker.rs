//! Module for handling the background batching task.

use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use tokio::task::JoinHandle;
use super::queue::RequestQueue;

/// A handle for managing the background task that drains a [`RequestQueue`].
///
/// Shutting the handle down (explicitly or by dropping it) clears the running
/// flag and closes the queue, which wakes the task if it is idle and resolves
/// every request still queued with a closed handle.
///
/// # Example
///
/// ```ignore
/// let queue = Arc::new(RequestQueue::new());
/// let worker = BatchWorkerHandle::new(queue.clone(), |running, queue| {
///     tokio::spawn(async move {
///         while running.load(Ordering::SeqCst) {
///             match queue.pop(None).await {
///                 Some(request) => request.resolve(Ok(vec![])),
///                 None => break,
///             }
///         }
///     })
/// });
///
/// // Worker will be automatically shut down when dropped
/// ```
pub struct BatchWorkerHandle {
    /// Flag indicating whether the background task should continue running
    running: Arc<AtomicBool>,

    /// Handle to the spawned background task, becomes `None` after shutdown is initiated
    handle: Option<JoinHandle<()>>,

    /// The queue the task drains
    queue: Arc<RequestQueue>,
}

impl BatchWorkerHandle {
    /// Creates a new `BatchWorkerHandle` by spawning a background task.
    ///
    /// # Parameters
    ///
    /// * `queue` - The queue the task consumes, closed on shutdown
    /// * `task` - A function that takes a running flag and the queue, and returns a `JoinHandle`.
    ///   This function is responsible for creating and spawning the actual background task.
    pub fn new<F>(queue: Arc<RequestQueue>, task: F) -> Self
    where
        F: FnOnce(Arc<AtomicBool>, Arc<RequestQueue>) -> JoinHandle<()>,
    {
        let running = Arc::new(AtomicBool::new(true));
        let handle = task(running.clone(), queue.clone());

        Self {
            running,
            handle: Some(handle),
            queue,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Initiates a graceful shutdown of the background task.
    ///
    /// This method:
    /// 1. Sets the running flag to `false`
    /// 2. Closes the queue, waking the task so it can observe that it should stop
    /// 3. Takes ownership of the task handle and, when a runtime is available,
    ///    spawns a separate task to await its completion
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.queue.close();

        if let Some(handle) = self.handle.take() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(async move {
                    let _ = handle.await;
                });
            }
        }
    }
}

impl Drop for BatchWorkerHandle {
    /// Ensures the background task is properly terminated when the handle is dropped.
    fn drop(&mut self) {
        self.shutdown();
    }
}
