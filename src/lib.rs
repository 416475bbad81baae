//! Bridge from Taskcluster task lifecycle events to Treeherder jobs.
//!
//! The crate consumes task events published by the queue, translates each
//! run into a normalized dashboard job record, enriches the record with
//! artifact links and log references, and forwards it to a publisher.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure translation logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for artifact listing and publishing
//! - **Adapters**: Concrete implementations of ports (in-memory, channels)
//!
//! # Modules
//!
//! - [`job`]: Task-run-to-job mapping, artifact linking and the event pipeline
//! - [`config`]: Bridge configuration

pub mod config;
pub mod job;
