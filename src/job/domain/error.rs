//! Error types for job domain validation and state mapping.

use super::{RunId, TaskId};
use thiserror::Error;

/// Errors returned while constructing domain values from raw event data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobDomainError {
    /// The task identifier is not a 22-character slug encoding a UUID.
    #[error("invalid task id '{0}', expected a 22-character slug")]
    InvalidTaskId(String),

    /// The timestamp is not valid RFC 3339.
    #[error("invalid timestamp '{0}', expected RFC 3339")]
    InvalidTimestamp(String),
}

/// Errors that make an event impossible to translate into a job record.
///
/// Every variant describes a caller or data contract violation; none is
/// recoverable by retrying the same input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobMappingError {
    /// The requested run index does not exist in the status snapshot.
    #[error("run {run_id} not found for task {task_id} ({run_count} runs)")]
    RunNotFound {
        /// Task whose snapshot was searched.
        task_id: TaskId,
        /// Requested run index.
        run_id: RunId,
        /// Number of runs present in the snapshot.
        run_count: usize,
    },

    /// A run state requires a timestamp the snapshot does not carry.
    #[error("run {run_id} of task {task_id} is {state} but has no {field} timestamp")]
    MissingTimestamp {
        /// Task owning the run.
        task_id: TaskId,
        /// Run lacking the timestamp.
        run_id: RunId,
        /// Run state that requires the timestamp.
        state: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The run state is outside the mapped vocabulary.
    #[error("run {run_id} of task {task_id} has unmappable state '{state}'")]
    UnknownRunState {
        /// Task owning the run.
        task_id: TaskId,
        /// Run with the unknown state.
        run_id: RunId,
        /// Raw state value.
        state: String,
    },

    /// No task route starts with the configured prefix.
    #[error("task {task_id} has no route with prefix '{prefix}'")]
    NoRoute {
        /// Task without a dashboard route.
        task_id: TaskId,
        /// Prefix that was searched for.
        prefix: String,
    },

    /// A route matched the prefix but does not have a supported shape.
    #[error("malformed route '{0}'")]
    MalformedRoute(String),
}

/// Error returned while parsing run states from event payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown run state: {0}")]
pub struct ParseRunStateError(pub String);
