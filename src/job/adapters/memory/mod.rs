//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! tests and for replaying recorded events without network access.

mod artifacts;
mod publisher;

pub use artifacts::{ArtifactFixture, DEFAULT_PAGE_SIZE, InMemoryArtifactLister};
pub use publisher::InMemoryJobPublisher;
