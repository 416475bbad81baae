//! Translation of a queue task run into a dashboard job record.

use crate::config::BridgeConfig;
use crate::job::domain::{
    CompletionOutcome, JobDisplay, JobInfo, JobLink, JobMappingError, JobRecord, JobRecordData,
    JobResult, JobState, PushInfo, Run, RunId, RunState, StatusSnapshot, TaskDefinition, TaskId,
    Timestamp, TreeherderConfig,
};

/// Group symbol used by the dashboard for ungrouped jobs.
const UNGROUPED_SYMBOL: &str = "?";
/// Tier assigned when the task does not specify one.
const DEFAULT_TIER: u8 = 1;
/// Reason reported when the task does not specify one.
const DEFAULT_REASON: &str = "scheduled";
/// Label assigned when the task declares no collections.
const DEFAULT_LABEL: &str = "opt";
/// Link label of the task inspector link.
const INSPECT_LABEL: &str = "inspect";

/// State, result and timing derived from a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunResolution {
    state: JobState,
    result: JobResult,
    time_started: Option<Timestamp>,
    time_finished: Option<Timestamp>,
}

/// Pure translator from task runs to job records.
///
/// The mapper holds only configuration; identical inputs always produce
/// identical records, so redelivered events are idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMapper {
    route_prefix: String,
    inspector_base_url: String,
}

impl StateMapper {
    /// Creates a mapper for routes starting with `route_prefix`.
    #[must_use]
    pub fn new(route_prefix: impl Into<String>, inspector_base_url: impl Into<String>) -> Self {
        Self {
            route_prefix: route_prefix.into(),
            inspector_base_url: inspector_base_url.into(),
        }
    }

    /// Creates a mapper from bridge configuration.
    #[must_use]
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.route_prefix, &config.inspector_base_url)
    }

    /// Returns the route prefix the mapper matches.
    #[must_use]
    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    /// Decodes the push coordinates from the first dashboard route of a task.
    ///
    /// # Errors
    ///
    /// Returns [`JobMappingError::NoRoute`] when no route carries the
    /// configured prefix and [`JobMappingError::MalformedRoute`] when the
    /// first matching route cannot be decoded.
    pub fn push_info(
        &self,
        task: &TaskDefinition,
        task_id: &TaskId,
    ) -> Result<PushInfo, JobMappingError> {
        PushInfo::from_routes(task.routes.as_slice(), &self.route_prefix)?
            .ok_or_else(|| JobMappingError::NoRoute {
                task_id: task_id.clone(),
                prefix: self.route_prefix.clone(),
            })
    }

    /// Maps one run of a task to a job record.
    ///
    /// `outcome` decides between `success` and `testfailed` for completed
    /// runs and is ignored for every other state.
    ///
    /// # Errors
    ///
    /// Returns [`JobMappingError::RunNotFound`] when `run_id` is outside the
    /// snapshot, [`JobMappingError::UnknownRunState`] for run states without
    /// a job counterpart, [`JobMappingError::MissingTimestamp`] when the run
    /// state requires a timestamp the run lacks, and
    /// [`JobMappingError::NoRoute`] or [`JobMappingError::MalformedRoute`]
    /// when the task has no usable dashboard route.
    pub fn map(
        &self,
        task: &TaskDefinition,
        status: &StatusSnapshot,
        run_id: RunId,
        outcome: CompletionOutcome,
    ) -> Result<JobRecord, JobMappingError> {
        let task_id = &status.task_id;
        let run = status
            .run(run_id)
            .ok_or_else(|| JobMappingError::RunNotFound {
                task_id: task_id.clone(),
                run_id,
                run_count: status.runs.len(),
            })?;
        let resolution = resolve_run(task_id, run_id, run, outcome)?;
        let push = self.push_info(task, task_id)?;

        let hints = task.treeherder().cloned().unwrap_or_default();
        let inspect_link = JobLink {
            label: INSPECT_LABEL.to_owned(),
            link_text: task_id.to_string(),
            url: format!("{}/#{task_id}/{run_id}", self.inspector_base_url),
        };

        Ok(JobRecord::from_data(JobRecordData {
            push,
            task_id: task_id.clone(),
            run_id,
            is_retried: resolution.result == JobResult::Retry,
            display: display_for(task, &hints),
            state: resolution.state,
            result: resolution.result,
            time_started: resolution.time_started,
            time_finished: resolution.time_finished,
            owner: task.metadata.owner.clone(),
            reason: hints
                .reason
                .clone()
                .unwrap_or_else(|| DEFAULT_REASON.to_owned()),
            product_name: hints.product_name.clone(),
            tier: hints.tier.unwrap_or(DEFAULT_TIER),
            job_kind: hints.job_kind.unwrap_or_default(),
            platform: hints
                .machine
                .as_ref()
                .map(|machine| machine.platform.clone()),
            labels: labels_for(&hints),
            job_info: JobInfo {
                summary: task.metadata.description.clone(),
                links: vec![inspect_link],
            },
        }))
    }
}

fn resolve_run(
    task_id: &TaskId,
    run_id: RunId,
    run: &Run,
    outcome: CompletionOutcome,
) -> Result<RunResolution, JobMappingError> {
    let state =
        RunState::try_from(run.state.as_str()).map_err(|_| JobMappingError::UnknownRunState {
            task_id: task_id.clone(),
            run_id,
            state: run.state.clone(),
        })?;
    let require = |value: Option<&Timestamp>, field: &'static str| {
        value
            .cloned()
            .ok_or_else(|| JobMappingError::MissingTimestamp {
                task_id: task_id.clone(),
                run_id,
                state: state.as_str().to_owned(),
                field,
            })
    };

    let resolution = match state {
        RunState::Pending => RunResolution {
            state: JobState::Pending,
            result: JobResult::Unknown,
            time_started: None,
            time_finished: None,
        },
        RunState::Running => RunResolution {
            state: JobState::Running,
            result: JobResult::Unknown,
            time_started: Some(require(run.started.as_ref(), "started")?),
            time_finished: None,
        },
        RunState::Completed | RunState::Failed => RunResolution {
            state: JobState::Completed,
            result: if state == RunState::Completed {
                outcome.job_result()
            } else {
                JobResult::Busted
            },
            time_started: Some(require(run.started.as_ref(), "started")?),
            time_finished: Some(require(run.resolved.as_ref(), "resolved")?),
        },
        // Exceptions may resolve runs that never started.
        RunState::Exception => RunResolution {
            state: JobState::Completed,
            result: JobResult::from_exception_reason(run.reason_resolved.as_deref()),
            time_started: run.started.clone(),
            time_finished: run.resolved.clone(),
        },
        // A run is never unscheduled; only whole tasks are.
        RunState::Unscheduled => {
            return Err(JobMappingError::UnknownRunState {
                task_id: task_id.clone(),
                run_id,
                state: run.state.clone(),
            });
        }
    };
    Ok(resolution)
}

fn display_for(task: &TaskDefinition, hints: &TreeherderConfig) -> JobDisplay {
    JobDisplay {
        job_symbol: hints.symbol.clone(),
        job_name: task.metadata.name.clone(),
        group_symbol: hints
            .group_symbol
            .clone()
            .unwrap_or_else(|| UNGROUPED_SYMBOL.to_owned()),
        group_name: hints.group_name.clone(),
    }
}

fn labels_for(hints: &TreeherderConfig) -> Vec<String> {
    if hints.collection.is_empty() {
        return vec![DEFAULT_LABEL.to_owned()];
    }
    hints.collection.keys().cloned().collect()
}
