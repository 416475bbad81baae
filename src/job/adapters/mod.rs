//! Adapter implementations of the job ports.

mod channel;
pub mod memory;

pub use channel::{ChannelJobPublisher, PublishedJob};
