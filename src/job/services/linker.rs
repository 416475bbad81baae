//! Artifact link aggregation for job records.
//!
//! [`ArtifactLinker`] walks every page of a run's artifact listing, turns
//! each artifact into a download link, and surfaces well-known logs as log
//! references. Listing failures never fail the job: whatever was collected
//! before the failure is still applied.

use crate::config::{BridgeConfig, LogArtifactTable};
use crate::job::{
    domain::{JobLink, JobRecord, LogReference, RunId, TaskId},
    ports::{Artifact, ArtifactLister, ArtifactListingError},
};
use std::collections::HashMap;

/// Link label used for every uploaded artifact.
pub const ARTIFACT_LINK_LABEL: &str = "artifact uploaded";

/// A job record after link enrichment.
#[derive(Debug, Clone)]
pub struct EnrichedJob {
    /// The enriched record; partially enriched when `error` is set.
    pub job: JobRecord,
    /// The listing failure that cut enrichment short, if any.
    pub error: Option<ArtifactListingError>,
}

impl EnrichedJob {
    /// Returns whether every artifact page was retrieved.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Adds artifact links and log references to job records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLinker {
    queue_base_url: String,
    log_artifacts: LogArtifactTable,
}

impl ArtifactLinker {
    /// Creates a linker building URLs under `queue_base_url`.
    #[must_use]
    pub fn new(queue_base_url: impl Into<String>, log_artifacts: LogArtifactTable) -> Self {
        Self {
            queue_base_url: queue_base_url.into(),
            log_artifacts,
        }
    }

    /// Creates a linker from bridge configuration.
    #[must_use]
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.queue_base_url, config.log_artifacts.clone())
    }

    /// Returns the download URL of an artifact.
    #[must_use]
    pub fn artifact_url(&self, task_id: &TaskId, run_id: RunId, artifact_name: &str) -> String {
        format!(
            "{}/task/{task_id}/runs/{run_id}/artifacts/{artifact_name}",
            self.queue_base_url
        )
    }

    /// Appends links for every artifact of the run, in listing order.
    ///
    /// Same-named artifacts from different directories are told apart by a
    /// ` (n)` suffix on every occurrence after the first. A listing failure
    /// is logged and returned in [`EnrichedJob::error`]; artifacts from pages
    /// retrieved before the failure are still linked.
    pub async fn enrich<L>(
        &self,
        mut job: JobRecord,
        lister: &L,
        task_id: &TaskId,
        run_id: RunId,
    ) -> EnrichedJob
    where
        L: ArtifactLister + ?Sized,
    {
        let (artifacts, error) = collect_artifacts(lister, task_id, run_id).await;
        if let Some(err) = &error {
            tracing::warn!(
                task_id = %task_id,
                run_id = run_id.value(),
                linked = artifacts.len(),
                error = %err,
                "artifact listing failed, publishing partial links"
            );
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for artifact in &artifacts {
            let url = self.artifact_url(task_id, run_id, &artifact.name);
            if let Some(label) = self.log_artifacts.label_for(&artifact.name) {
                job.push_log(LogReference {
                    name: label.to_owned(),
                    url: url.clone(),
                });
            }
            let link_text = disambiguate(&mut seen, display_name(&artifact.name));
            job.push_link(JobLink {
                label: ARTIFACT_LINK_LABEL.to_owned(),
                link_text,
                url,
            });
        }

        EnrichedJob { job, error }
    }
}

/// Retrieves every page of the listing, stopping at the first failure.
async fn collect_artifacts<L>(
    lister: &L,
    task_id: &TaskId,
    run_id: RunId,
) -> (Vec<Artifact>, Option<ArtifactListingError>)
where
    L: ArtifactLister + ?Sized,
{
    let first = match lister.list(task_id, run_id, None).await {
        Ok(page) => page,
        Err(err) => return (Vec::new(), Some(err)),
    };
    let mut artifacts = first.artifacts;
    let mut next_token = first.continuation_token;

    while let Some(token) = next_token {
        match lister.list(task_id, run_id, Some(token)).await {
            Ok(mut page) => {
                artifacts.append(&mut page.artifacts);
                next_token = page.continuation_token;
            }
            Err(err) => return (artifacts, Some(err)),
        }
    }
    (artifacts, None)
}

/// Returns the last path segment of an artifact name.
fn display_name(artifact_name: &str) -> &str {
    let trimmed = artifact_name.trim_end_matches('/');
    trimmed
        .rsplit_once('/')
        .map_or(trimmed, |(_, base_name)| base_name)
}

/// Returns the display name, suffixed with its duplicate index after the
/// first occurrence.
fn disambiguate<'a>(seen: &mut HashMap<&'a str, usize>, base_name: &'a str) -> String {
    let occurrences = seen.entry(base_name).or_insert(0);
    let link_text = if *occurrences == 0 {
        base_name.to_owned()
    } else {
        format!("{base_name} ({occurrences})")
    };
    *occurrences += 1;
    link_text
}
