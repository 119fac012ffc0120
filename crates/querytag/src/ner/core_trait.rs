use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::span::Entity;

/// Body of an inbound prediction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub input: String,
}

/// # EntityExtractor
///
/// The service entry point: text in, entities out.
///
/// Implementations normalize the text (trim, lowercase) and return entities
/// whose offsets index the normalized text. Empty input yields an empty list
/// without touching the model; input longer than the configured maximum is
/// rejected with [`Error::TooLong`](crate::error::Error::TooLong) before
/// anything is queued.
///
/// # Async Behavior
///
/// The call suspends until the batch holding the request has been run, so
/// callers see plain request/response semantics while the model sees batches.
#[async_trait]
pub trait EntityExtractor {
    async fn predict(&self, text: &str) -> Result<Vec<Entity>>;

    /// Convenience wrapper over [`predict`](EntityExtractor::predict) for the wire type.
    async fn predict_request(&self, request: &PredictRequest) -> Result<Vec<Entity>> {
        self.predict(&request.input).await
    }
}
