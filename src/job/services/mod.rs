//! Application services for job translation.

mod linker;
mod mapper;
mod pipeline;

pub use linker::{ARTIFACT_LINK_LABEL, ArtifactLinker, EnrichedJob};
pub use mapper::StateMapper;
pub use pipeline::{
    EventKind, JobPipeline, PipelineError, PipelineResult, PipelineSummary, TaskEvent,
};
