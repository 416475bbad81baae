//! Event pipeline from queue task events to published dashboard jobs.
//!
//! Events are sharded across a fixed pool of workers by task id, so events
//! of one task are handled in arrival order while different tasks proceed
//! concurrently. Dropping the inbound sender drains the pool.

use super::{ArtifactLinker, EnrichedJob, StateMapper};
use crate::config::BridgeConfig;
use crate::job::{
    domain::{CompletionOutcome, JobMappingError, RunId, StatusSnapshot, TaskDefinition},
    ports::{ArtifactLister, JobPublishError, JobPublisher},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::ops::AddAssign;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Depth of each worker's queue.
const WORKER_QUEUE_DEPTH: usize = 32;

/// Queue exchange an event arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A run became pending.
    Pending,
    /// A run was claimed.
    Running,
    /// A run completed.
    Completed,
    /// A run failed.
    Failed,
    /// A run was resolved as an exception.
    Exception,
}

impl EventKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Exception => "exception",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound task lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    /// Exchange the event arrived on.
    ///
    /// Only used for diagnostics; the run state in `status` decides the job
    /// state.
    pub kind: EventKind,
    /// Definition of the task.
    pub task: TaskDefinition,
    /// Status snapshot carried by the event.
    pub status: StatusSnapshot,
    /// Run the event is about.
    pub run_id: RunId,
    /// Worker-reported outcome for completed runs.
    #[serde(default)]
    pub outcome: CompletionOutcome,
}

impl TaskEvent {
    /// Returns the snapshot state of the event's run when it differs from
    /// the exchange the event arrived on.
    #[must_use]
    pub fn run_state_mismatch(&self) -> Option<&str> {
        self.status
            .run(self.run_id)
            .map(|run| run.state.as_str())
            .filter(|state| *state != self.kind.as_str())
    }
}

/// Per-event pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The event could not be translated into a job.
    #[error(transparent)]
    Mapping(#[from] JobMappingError),
    /// The job could not be published.
    #[error(transparent)]
    Publish(#[from] JobPublishError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Counters reported when the pipeline shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Events taken from the inbound channel.
    pub received: usize,
    /// Jobs handed to the publisher.
    pub published: usize,
    /// Published jobs whose artifact listing was cut short.
    pub partially_linked: usize,
    /// Events rejected by the state mapper.
    pub rejected: usize,
    /// Jobs the publisher refused.
    pub publish_failed: usize,
    /// Events dropped because their worker had stopped.
    pub lost: usize,
}

impl AddAssign for PipelineSummary {
    fn add_assign(&mut self, other: Self) {
        self.received += other.received;
        self.published += other.published;
        self.partially_linked += other.partially_linked;
        self.rejected += other.rejected;
        self.publish_failed += other.publish_failed;
        self.lost += other.lost;
    }
}

/// Task-event-to-job pipeline.
pub struct JobPipeline<L, P>
where
    L: ArtifactLister + 'static,
    P: JobPublisher + 'static,
{
    mapper: StateMapper,
    linker: ArtifactLinker,
    lister: Arc<L>,
    publisher: Arc<P>,
    worker_count: usize,
}

impl<L, P> JobPipeline<L, P>
where
    L: ArtifactLister + 'static,
    P: JobPublisher + 'static,
{
    /// Creates a single-worker pipeline.
    #[must_use]
    pub const fn new(
        mapper: StateMapper,
        linker: ArtifactLinker,
        lister: Arc<L>,
        publisher: Arc<P>,
    ) -> Self {
        Self {
            mapper,
            linker,
            lister,
            publisher,
            worker_count: 1,
        }
    }

    /// Creates a pipeline from bridge configuration.
    #[must_use]
    pub fn from_config(config: &BridgeConfig, lister: Arc<L>, publisher: Arc<P>) -> Self {
        Self::new(
            StateMapper::from_config(config),
            ArtifactLinker::from_config(config),
            lister,
            publisher,
        )
        .with_worker_count(config.worker_count)
    }

    /// Sets the number of concurrent workers; zero is treated as one.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    /// Maps, enriches and publishes a single event.
    ///
    /// Artifact listing failures do not fail the event; they are reported in
    /// [`EnrichedJob::error`] of the returned value.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Mapping`] when the event cannot be mapped and
    /// [`PipelineError::Publish`] when the publisher rejects the job.
    pub async fn process(&self, event: &TaskEvent) -> PipelineResult<EnrichedJob> {
        let job = self
            .mapper
            .map(&event.task, &event.status, event.run_id, event.outcome)?;
        let push = self.mapper.push_info(&event.task, &event.status.task_id)?;
        if let Some(run_state) = event.run_state_mismatch() {
            tracing::warn!(
                task_id = %event.status.task_id,
                run_id = event.run_id.value(),
                kind = %event.kind,
                run_state,
                "event kind disagrees with run state, mapping by run state"
            );
        }

        let enriched = self
            .linker
            .enrich(job, &*self.lister, &event.status.task_id, event.run_id)
            .await;
        self.publisher.publish(&push, &enriched.job).await?;
        tracing::debug!(
            task_id = %event.status.task_id,
            run_id = event.run_id.value(),
            kind = %event.kind,
            project = push.project(),
            state = %enriched.job.state(),
            result = %enriched.job.result(),
            "published job"
        );
        Ok(enriched)
    }

    /// Consumes events until the inbound channel closes, then drains the
    /// workers and returns the combined counters.
    pub async fn run(self, mut inbound: mpsc::Receiver<TaskEvent>) -> PipelineSummary {
        let pipeline = Arc::new(self);
        let mut workers = JoinSet::new();
        let mut shards = Vec::with_capacity(pipeline.worker_count);
        for _ in 0..pipeline.worker_count {
            let (sender, receiver) = mpsc::channel(WORKER_QUEUE_DEPTH);
            shards.push(sender);
            workers.spawn(Arc::clone(&pipeline).work(receiver));
        }

        let mut summary = PipelineSummary::default();
        while let Some(event) = inbound.recv().await {
            if let Some(shard) = shards.get(shard_for(&event, shards.len())) {
                dispatch(shard, event, &mut summary).await;
            }
        }
        drop(shards);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(worker_summary) => summary += worker_summary,
                Err(err) => tracing::error!(error = %err, "pipeline worker terminated abnormally"),
            }
        }
        tracing::info!(
            received = summary.received,
            published = summary.published,
            partially_linked = summary.partially_linked,
            rejected = summary.rejected,
            publish_failed = summary.publish_failed,
            lost = summary.lost,
            "pipeline drained"
        );
        summary
    }

    async fn work(self: Arc<Self>, mut events: mpsc::Receiver<TaskEvent>) -> PipelineSummary {
        let mut summary = PipelineSummary::default();
        while let Some(event) = events.recv().await {
            summary.received += 1;
            match self.process(&event).await {
                Ok(enriched) => {
                    summary.published += 1;
                    if !enriched.is_complete() {
                        summary.partially_linked += 1;
                    }
                }
                Err(PipelineError::Mapping(err)) => {
                    summary.rejected += 1;
                    tracing::warn!(
                        task_id = %event.status.task_id,
                        run_id = event.run_id.value(),
                        kind = %event.kind,
                        error = %err,
                        "rejected task event"
                    );
                }
                Err(PipelineError::Publish(err)) => {
                    summary.publish_failed += 1;
                    tracing::warn!(
                        task_id = %event.status.task_id,
                        run_id = event.run_id.value(),
                        error = %err,
                        "failed to publish job"
                    );
                }
            }
        }
        summary
    }
}

/// Hands an event to its worker; a closed queue means the worker stopped.
async fn dispatch(
    shard: &mpsc::Sender<TaskEvent>,
    event: TaskEvent,
    summary: &mut PipelineSummary,
) {
    if let Err(mpsc::error::SendError(dropped)) = shard.send(event).await {
        summary.lost += 1;
        tracing::error!(
            task_id = %dropped.status.task_id,
            run_id = dropped.run_id.value(),
            kind = %dropped.kind,
            "pipeline worker stopped, dropping event"
        );
    }
}

/// Picks the worker for an event; all events of a task share a worker.
fn shard_for(event: &TaskEvent, shard_count: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    event.status.task_id.hash(&mut hasher);
    let count = u64::try_from(shard_count).unwrap_or(u64::MAX);
    hasher
        .finish()
        .checked_rem(count)
        .and_then(|shard| usize::try_from(shard).ok())
        .unwrap_or_default()
}
