//! Port contracts for job translation.
//!
//! Ports define infrastructure-agnostic interfaces to the queue's artifact
//! listing and to the reporting backend.

pub mod artifacts;
pub mod publisher;

pub use artifacts::{
    Artifact, ArtifactLister, ArtifactListingError, ArtifactListingResult, ArtifactPage,
};
pub use publisher::{JobPublishError, JobPublishResult, JobPublisher};
