use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use crate::communication::Request;

/// # RequestQueue
///
/// Unbounded FIFO of requests waiting to be batched.
///
/// Any number of producers may [`push`](RequestQueue::push) concurrently;
/// a single consumer drains it with [`pop`](RequestQueue::pop), either
/// blocking until a request arrives or giving up at a deadline.
///
/// The lock is never held across an await point. Wakeups go through a
/// [`Notify`], whose stored permit covers a push that lands between the
/// consumer's emptiness check and its wait.
#[derive(Debug, Default)]
pub struct RequestQueue {
    /// Requests in arrival order
    items: Mutex<VecDeque<Request>>,

    /// Signals the consumer that a request was pushed or the queue closed
    notifier: Notify,

    /// Once set, pushes are refused and the consumer drains to `None`
    closed: AtomicBool,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request, handing it back if the queue is closed.
    pub fn push(&self, request: Request) -> Result<(), Request> {
        {
            let mut items = self.items.lock();
            if self.closed.load(Ordering::SeqCst) {
                return Err(request);
            }
            items.push_back(request);
        }
        self.notifier.notify_one();
        Ok(())
    }

    /// Takes the oldest request.
    ///
    /// With `deadline = None` this waits as long as it takes. With a deadline
    /// it returns `None` once the deadline passes with the queue still empty;
    /// a request already queued is returned even if the deadline is behind us.
    /// Returns `None` immediately once the queue is closed and empty.
    pub async fn pop(&self, deadline: Option<Instant>) -> Option<Request> {
        loop {
            {
                let mut items = self.items.lock();
                if let Some(request) = items.pop_front() {
                    return Some(request);
                }
                if self.closed.load(Ordering::SeqCst) {
                    return None;
                }
            }

            match deadline {
                None => self.notifier.notified().await,
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, self.notifier.notified()).await.is_err() {
                        return None;
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Refuses further pushes and drops whatever is still queued.
    ///
    /// Dropped requests close their outcome handles, so their callers see
    /// [`Error::Closed`](crate::error::Error::Closed).
    pub fn close(&self) {
        let abandoned: Vec<Request> = {
            let mut items = self.items.lock();
            self.closed.store(true, Ordering::SeqCst);
            items.drain(..).collect()
        };
        drop(abandoned);
        self.notifier.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
