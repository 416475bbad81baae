//! Translation of queue task events into dashboard jobs.
//!
//! This module maps each run of a dashboard-routed task to a normalized job
//! record, enriches the record with artifact links and log references, and
//! hands it to a publisher. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
