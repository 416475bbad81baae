//! Artifact listing port used to enumerate the artifacts of a run.

use crate::job::domain::{RunId, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for artifact listing operations.
pub type ArtifactListingResult<T> = Result<T, ArtifactListingError>;

/// An artifact produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Slash-delimited artifact path, e.g. `public/logs/live.log`.
    pub name: String,
}

impl Artifact {
    /// Creates an artifact entry.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One page of an artifact listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPage {
    /// Artifacts on this page, in listing order.
    pub artifacts: Vec<Artifact>,
    /// Token for the next page; `None` on the last page.
    #[serde(default)]
    pub continuation_token: Option<String>,
}

/// Paginated artifact listing contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactLister: Send + Sync {
    /// Lists one page of the artifacts of a run.
    ///
    /// Passing `None` requests the first page; passing the token from a
    /// previous page requests the page after it.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactListingError`] when the listing cannot be retrieved.
    async fn list(
        &self,
        task_id: &TaskId,
        run_id: RunId,
        continuation_token: Option<String>,
    ) -> ArtifactListingResult<ArtifactPage>;
}

/// Errors returned by artifact listing implementations.
#[derive(Debug, Clone, Error)]
pub enum ArtifactListingError {
    /// The continuation token was not issued by the listing service.
    #[error("invalid continuation token '{0}'")]
    InvalidContinuationToken(String),

    /// Transport or service failure.
    #[error("artifact listing failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ArtifactListingError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
