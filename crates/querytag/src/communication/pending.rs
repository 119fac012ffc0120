use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use crate::error::Error;
use crate::span::Entity;
use super::request::Outcome;

/// # Pending
///
/// The caller's half of a request's outcome handle: a future over a Tokio
/// oneshot receiver that resolves once, with the entities of the request or
/// the error of its batch.
pub struct Pending {
    /// The underlying channel receiver
    receiver: oneshot::Receiver<Outcome>,
}

impl Pending {
    pub(crate) fn new(receiver: oneshot::Receiver<Outcome>) -> Self {
        Self { receiver }
    }
}

impl Future for Pending {
    type Output = Result<Vec<Entity>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(|received| match received {
                Ok(Ok(entities)) => Ok(entities),
                Ok(Err(batch_error)) => Err(Error::BatchFailure(batch_error)),
                Err(_) => Err(Error::Closed),
            })
    }
}
