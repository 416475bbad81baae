//! Normalized dashboard job record and its value types.

use super::{PushInfo, RunId, TaskId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Build system name reported for every job.
pub const BUILD_SYSTEM: &str = "taskcluster";

/// Dashboard job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Waiting for a worker.
    Pending,
    /// Executing on a worker.
    Running,
    /// Resolved; see [`JobResult`] for the outcome.
    Completed,
}

impl JobState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard job result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobResult {
    /// No result yet.
    Unknown,
    /// Completed successfully.
    Success,
    /// Completed with test failures.
    Testfailed,
    /// Failed for infrastructure or deadline reasons.
    Busted,
    /// Resolved with an unclassified exception.
    Exception,
    /// Lost its worker and will be retried.
    Retry,
    /// Cancelled by a user.
    Usercancel,
    /// Replaced by a newer push.
    Superseded,
}

impl JobResult {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Success => "success",
            Self::Testfailed => "testfailed",
            Self::Busted => "busted",
            Self::Exception => "exception",
            Self::Retry => "retry",
            Self::Usercancel => "usercancel",
            Self::Superseded => "superseded",
        }
    }

    /// Classifies an exception run by its resolution reason.
    ///
    /// Unrecognised or missing reasons classify as [`JobResult::Exception`].
    #[must_use]
    pub fn from_exception_reason(reason: Option<&str>) -> Self {
        match reason {
            Some("deadline-exceeded") => Self::Busted,
            Some("canceled") => Self::Usercancel,
            Some("superseded") => Self::Superseded,
            Some("claim-expired" | "worker-shutdown") => Self::Retry,
            _ => Self::Exception,
        }
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome reported by the worker for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// The task succeeded.
    #[default]
    Success,
    /// The task ran to completion but reported failure.
    Failure,
}

impl CompletionOutcome {
    /// Returns the job result for a completed run with this outcome.
    #[must_use]
    pub const fn job_result(self) -> JobResult {
        match self {
            Self::Success => JobResult::Success,
            Self::Failure => JobResult::Testfailed,
        }
    }
}

/// Kind of work a job performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Produces build artifacts.
    Build,
    /// Runs tests.
    Test,
    /// Anything else.
    #[default]
    Other,
}

/// Reference to a log the dashboard can parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogReference {
    /// Log label recognised by the dashboard.
    pub name: String,
    /// Download URL.
    pub url: String,
}

/// Link displayed alongside a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLink {
    /// Category label.
    pub label: String,
    /// Text shown for the link.
    pub link_text: String,
    /// Target URL.
    pub url: String,
}

/// Free-form job details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Summary text, taken from the task description.
    pub summary: String,
    /// Links shown in the job details panel.
    pub links: Vec<JobLink>,
}

/// Symbols and names used to render a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDisplay {
    /// Job symbol.
    pub job_symbol: String,
    /// Job name.
    pub job_name: String,
    /// Group symbol, `?` when ungrouped.
    pub group_symbol: String,
    /// Group name.
    pub group_name: Option<String>,
}

/// Parameter object for constructing a [`JobRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecordData {
    /// Push the job belongs to.
    pub push: PushInfo,
    /// Task the job was created from.
    pub task_id: TaskId,
    /// Run the job represents.
    pub run_id: RunId,
    /// Whether the run will be retried by the queue.
    pub is_retried: bool,
    /// Display hints.
    pub display: JobDisplay,
    /// Job state.
    pub state: JobState,
    /// Job result.
    pub result: JobResult,
    /// When the run started.
    pub time_started: Option<Timestamp>,
    /// When the run was resolved.
    pub time_finished: Option<Timestamp>,
    /// Task owner.
    pub owner: String,
    /// Why the job ran.
    pub reason: String,
    /// Product name.
    pub product_name: Option<String>,
    /// Visibility tier.
    pub tier: u8,
    /// Kind of job.
    pub job_kind: JobKind,
    /// Machine platform name.
    pub platform: Option<String>,
    /// Collection labels.
    pub labels: Vec<String>,
    /// Initial job details.
    pub job_info: JobInfo,
}

/// Normalized job record delivered to the dashboard.
///
/// State and result are fixed at construction; enrichment may only append
/// logs and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    project: String,
    revision: String,
    push_id: Option<u64>,
    job_guid: String,
    task_id: TaskId,
    retry_id: RunId,
    is_retried: bool,
    display: JobDisplay,
    state: JobState,
    result: JobResult,
    time_started: Option<Timestamp>,
    time_finished: Option<Timestamp>,
    owner: String,
    reason: String,
    product_name: Option<String>,
    tier: u8,
    job_kind: JobKind,
    build_system: String,
    platform: Option<String>,
    labels: Vec<String>,
    logs: Vec<LogReference>,
    job_info: JobInfo,
}

impl JobRecord {
    /// Builds a job record from its components.
    ///
    /// The job GUID combines the decoded task UUID and the run id, so it is
    /// stable across redelivery of the same event.
    #[must_use]
    pub fn from_data(data: JobRecordData) -> Self {
        let job_guid = format!("{}/{}", data.task_id.as_uuid(), data.run_id);
        Self {
            project: data.push.project().to_owned(),
            revision: data.push.revision().to_owned(),
            push_id: data.push.push_id(),
            job_guid,
            task_id: data.task_id,
            retry_id: data.run_id,
            is_retried: data.is_retried,
            display: data.display,
            state: data.state,
            result: data.result,
            time_started: data.time_started,
            time_finished: data.time_finished,
            owner: data.owner,
            reason: data.reason,
            product_name: data.product_name,
            tier: data.tier,
            job_kind: data.job_kind,
            build_system: BUILD_SYSTEM.to_owned(),
            platform: data.platform,
            labels: data.labels,
            logs: Vec::new(),
            job_info: data.job_info,
        }
    }

    /// Returns the dashboard project.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the pushed revision.
    #[must_use]
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Returns the push id, when the route carried one.
    #[must_use]
    pub const fn push_id(&self) -> Option<u64> {
        self.push_id
    }

    /// Returns the job GUID (`<task uuid>/<run id>`).
    #[must_use]
    pub fn job_guid(&self) -> &str {
        &self.job_guid
    }

    /// Returns the originating task.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the run this job represents.
    #[must_use]
    pub const fn retry_id(&self) -> RunId {
        self.retry_id
    }

    /// Returns whether the queue will retry the run.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.is_retried
    }

    /// Returns the display hints.
    #[must_use]
    pub const fn display(&self) -> &JobDisplay {
        &self.display
    }

    /// Returns the job state.
    #[must_use]
    pub const fn state(&self) -> JobState {
        self.state
    }

    /// Returns the job result.
    #[must_use]
    pub const fn result(&self) -> JobResult {
        self.result
    }

    /// Returns the start timestamp.
    #[must_use]
    pub const fn time_started(&self) -> Option<&Timestamp> {
        self.time_started.as_ref()
    }

    /// Returns the finish timestamp.
    #[must_use]
    pub const fn time_finished(&self) -> Option<&Timestamp> {
        self.time_finished.as_ref()
    }

    /// Returns the task owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns why the job ran.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the product name.
    #[must_use]
    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    /// Returns the visibility tier.
    #[must_use]
    pub const fn tier(&self) -> u8 {
        self.tier
    }

    /// Returns the job kind.
    #[must_use]
    pub const fn job_kind(&self) -> JobKind {
        self.job_kind
    }

    /// Returns the build system name.
    #[must_use]
    pub fn build_system(&self) -> &str {
        &self.build_system
    }

    /// Returns the machine platform name.
    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// Returns the collection labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the log references.
    #[must_use]
    pub fn logs(&self) -> &[LogReference] {
        &self.logs
    }

    /// Returns the job details.
    #[must_use]
    pub const fn job_info(&self) -> &JobInfo {
        &self.job_info
    }

    /// Returns the display links.
    #[must_use]
    pub fn links(&self) -> &[JobLink] {
        &self.job_info.links
    }

    /// Appends a log reference.
    pub fn push_log(&mut self, log: LogReference) {
        self.logs.push(log);
    }

    /// Appends a display link.
    pub fn push_link(&mut self, link: JobLink) {
        self.job_info.links.push(link);
    }
}
