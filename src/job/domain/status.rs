//! Queue-side status snapshot of a task and its runs.

use super::{ParseRunStateError, RunId, TaskId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a single run as reported by the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// The task has not been scheduled.
    Unscheduled,
    /// The run is waiting for a worker.
    Pending,
    /// A worker has claimed the run.
    Running,
    /// The run finished and the worker reported completion.
    Completed,
    /// The run finished and the worker reported failure.
    Failed,
    /// The run was resolved by the queue or worker for a non-task reason.
    Exception,
}

impl RunState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Exception => "exception",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RunState {
    type Error = ParseRunStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "unscheduled" => Ok(Self::Unscheduled),
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "exception" => Ok(Self::Exception),
            _ => Err(ParseRunStateError(value.to_owned())),
        }
    }
}

/// The queue's current view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Task the snapshot describes.
    pub task_id: TaskId,
    /// Automatic retries the queue may still perform.
    #[serde(default)]
    pub retries_left: u32,
    /// Execution attempts, ordered by run id.
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl StatusSnapshot {
    /// Returns the run at the given index.
    #[must_use]
    pub fn run(&self, run_id: RunId) -> Option<&Run> {
        run_id.as_index().and_then(|index| self.runs.get(index))
    }
}

/// One execution attempt of a task.
///
/// The state is kept as the raw wire string so values outside the known
/// vocabulary reach the mapper instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Index of the run within the task.
    pub run_id: RunId,
    /// Raw run state.
    pub state: String,
    /// Why the run was created (`scheduled`, `retry`, `rerun`, ...).
    pub reason_created: String,
    /// Why the run was resolved, once it is.
    #[serde(default)]
    pub reason_resolved: Option<String>,
    /// When the run became pending.
    #[serde(default)]
    pub scheduled: Option<Timestamp>,
    /// When a worker claimed the run.
    #[serde(default)]
    pub started: Option<Timestamp>,
    /// When the run was resolved.
    #[serde(default)]
    pub resolved: Option<Timestamp>,
    /// Worker group of the claiming worker.
    #[serde(default)]
    pub worker_group: Option<String>,
    /// Identifier of the claiming worker.
    #[serde(default)]
    pub worker_id: Option<String>,
}

impl Run {
    /// Creates a freshly scheduled, pending run.
    #[must_use]
    pub fn pending(run_id: RunId, reason_created: impl Into<String>) -> Self {
        Self {
            run_id,
            state: RunState::Pending.as_str().to_owned(),
            reason_created: reason_created.into(),
            reason_resolved: None,
            scheduled: None,
            started: None,
            resolved: None,
            worker_group: None,
            worker_id: None,
        }
    }
}
