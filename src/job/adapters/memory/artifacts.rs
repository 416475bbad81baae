//! In-memory artifact listing with pagination and failure injection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::job::{
    domain::{RunId, TaskId},
    ports::{Artifact, ArtifactLister, ArtifactListingError, ArtifactListingResult, ArtifactPage},
};

/// Page size used by [`InMemoryArtifactLister::default`].
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Artifacts recorded for one run, as stored in replay fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactFixture {
    /// Task owning the run.
    pub task_id: TaskId,
    /// Run that produced the artifacts.
    pub run_id: RunId,
    /// Artifact names in listing order.
    pub artifacts: Vec<String>,
}

/// Thread-safe in-memory artifact listing.
///
/// Runs without recorded artifacts list as empty. Continuation tokens are
/// the decimal index of the next page.
#[derive(Debug, Clone)]
pub struct InMemoryArtifactLister {
    state: Arc<RwLock<ListerState>>,
    page_size: usize,
}

#[derive(Debug, Default)]
struct ListerState {
    artifacts: HashMap<(TaskId, RunId), Vec<Artifact>>,
    failing_pages: HashMap<(TaskId, RunId), usize>,
    calls: usize,
}

impl Default for InMemoryArtifactLister {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl InMemoryArtifactLister {
    /// Creates an empty lister serving [`DEFAULT_PAGE_SIZE`] artifacts per
    /// page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty lister serving `page_size` artifacts per page.
    ///
    /// A page size of zero is treated as one.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(ListerState::default())),
            page_size: page_size.max(1),
        }
    }

    /// Creates a lister preloaded with fixture entries.
    #[must_use]
    pub fn from_fixtures(fixtures: impl IntoIterator<Item = ArtifactFixture>) -> Self {
        let lister = Self::default();
        for fixture in fixtures {
            lister.record(&fixture.task_id, fixture.run_id, fixture.artifacts);
        }
        lister
    }

    /// Records the artifacts of a run, replacing earlier entries.
    pub fn record<I, S>(&self, task_id: &TaskId, run_id: RunId, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let artifacts = names.into_iter().map(Artifact::new).collect();
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.artifacts.insert((task_id.clone(), run_id), artifacts);
    }

    /// Makes the zero-based `page_index` of a run's listing fail.
    pub fn fail_page(&self, task_id: &TaskId, run_id: RunId, page_index: usize) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state
            .failing_pages
            .insert((task_id.clone(), run_id), page_index);
    }

    /// Returns the number of listing calls served so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .calls
    }
}

fn parse_page_index(token: Option<&str>) -> ArtifactListingResult<usize> {
    token.map_or(Ok(0), |raw| {
        raw.parse::<usize>()
            .map_err(|_| ArtifactListingError::InvalidContinuationToken(raw.to_owned()))
    })
}

#[async_trait]
impl ArtifactLister for InMemoryArtifactLister {
    async fn list(
        &self,
        task_id: &TaskId,
        run_id: RunId,
        continuation_token: Option<String>,
    ) -> ArtifactListingResult<ArtifactPage> {
        let mut state = self.state.write().map_err(|err| {
            ArtifactListingError::transport(std::io::Error::other(err.to_string()))
        })?;
        state.calls += 1;

        let page_index = parse_page_index(continuation_token.as_deref())?;
        let key = (task_id.clone(), run_id);
        if state.failing_pages.get(&key) == Some(&page_index) {
            return Err(ArtifactListingError::transport(std::io::Error::other(
                format!("injected failure listing page {page_index} of {task_id}/{run_id}"),
            )));
        }

        let recorded = state.artifacts.get(&key).map_or(&[][..], Vec::as_slice);
        let start = page_index.saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size).min(recorded.len());
        let Some(artifacts) = recorded.get(start..end).map(<[Artifact]>::to_vec) else {
            return Err(ArtifactListingError::InvalidContinuationToken(
                page_index.to_string(),
            ));
        };
        let next_token = (end < recorded.len()).then(|| (page_index + 1).to_string());

        Ok(ArtifactPage {
            artifacts,
            continuation_token: next_token,
        })
    }
}
