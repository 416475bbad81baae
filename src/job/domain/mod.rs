//! Domain model for translating queue task runs into dashboard jobs.
//!
//! The job domain holds the task definition and status snapshot received
//! from the queue, the route encoding of push coordinates, and the
//! normalized job record. All I/O stays outside the domain boundary.

mod error;
mod ids;
mod job;
mod route;
mod status;
mod task;

pub use error::{JobDomainError, JobMappingError, ParseRunStateError};
pub use ids::{RunId, TaskId, Timestamp};
pub use job::{
    BUILD_SYSTEM, CompletionOutcome, JobDisplay, JobInfo, JobKind, JobLink, JobRecord,
    JobRecordData, JobResult, JobState, LogReference,
};
pub use route::PushInfo;
pub use status::{Run, RunState, StatusSnapshot};
pub use task::{MachinePlatform, TaskDefinition, TaskExtra, TaskMetadata, TreeherderConfig};
