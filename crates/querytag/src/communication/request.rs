use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::warn;
use uuid::Uuid;
use crate::error::BatchError;
use crate::span::Entity;
use super::pending::Pending;

/// What a request resolves to: its entities, or the failure of its batch.
pub type Outcome = Result<Vec<Entity>, Arc<BatchError>>;

/// # Request
///
/// One normalized text waiting for entities, paired with the sending half of
/// its outcome handle.
///
/// Resolving consumes the request, so a request can be resolved at most once.
/// A request dropped without being resolved closes its channel, and the
/// waiting [`Pending`] reports [`Error::Closed`](crate::error::Error::Closed)
/// instead of hanging.
#[derive(Debug)]
pub struct Request {
    /// Unique identity, used in logs
    id: Uuid,

    /// The normalized text to run through the model
    text: String,

    /// When the request was created
    arrival: Instant,

    /// Channel for sending the outcome back to the caller
    sender: oneshot::Sender<Outcome>,
}

impl Request {
    /// Creates a request and the handle its caller awaits.
    pub fn new(text: String) -> (Self, Pending) {
        let (sender, receiver) = oneshot::channel();
        let request = Self {
            id: Uuid::new_v4(),
            text,
            arrival: Instant::now(),
            sender,
        };
        (request, Pending::new(receiver))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn arrival(&self) -> Instant {
        self.arrival
    }

    /// Hands the outcome to the caller.
    pub fn resolve(self, outcome: Outcome) {
        if self.sender.send(outcome).is_err() {
            // caller stopped waiting; nothing left to deliver to
            warn!(request_id = %self.id, "outcome dropped, receiver gone");
        }
    }

    /// Resolves with a batch failure.
    pub fn fail(self, error: Arc<BatchError>) {
        self.resolve(Err(error))
    }
}
