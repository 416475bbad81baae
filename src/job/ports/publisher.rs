//! Publishing port that hands finished job records to the reporting backend.

use crate::job::domain::{JobRecord, PushInfo};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for job publishing operations.
pub type JobPublishResult<T> = Result<T, JobPublishError>;

/// Job publishing contract.
///
/// Delivery guarantees and retries belong to implementations.
#[async_trait]
pub trait JobPublisher: Send + Sync {
    /// Publishes one job record for the push it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`JobPublishError`] when the record cannot be delivered.
    async fn publish(&self, push: &PushInfo, job: &JobRecord) -> JobPublishResult<()>;
}

/// Errors returned by job publisher implementations.
#[derive(Debug, Clone, Error)]
pub enum JobPublishError {
    /// The downstream consumer is gone.
    #[error("publisher channel closed")]
    Closed,

    /// Transport or backend failure.
    #[error("publish failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl JobPublishError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
