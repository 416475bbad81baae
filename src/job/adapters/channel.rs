//! Publisher forwarding jobs to an outbound channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::job::{
    domain::{JobRecord, PushInfo},
    ports::{JobPublishError, JobPublishResult, JobPublisher},
};

/// A job together with the push it was published for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedJob {
    /// Push coordinates of the job.
    pub push: PushInfo,
    /// The published record.
    pub job: JobRecord,
}

/// Publisher that hands jobs to whoever holds the receiving end.
#[derive(Debug, Clone)]
pub struct ChannelJobPublisher {
    outbound: mpsc::Sender<PublishedJob>,
}

impl ChannelJobPublisher {
    /// Creates a publisher sending into `outbound`.
    #[must_use]
    pub const fn new(outbound: mpsc::Sender<PublishedJob>) -> Self {
        Self { outbound }
    }

    /// Creates a publisher and the receiver of its bounded channel.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PublishedJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl JobPublisher for ChannelJobPublisher {
    async fn publish(&self, push: &PushInfo, job: &JobRecord) -> JobPublishResult<()> {
        self.outbound
            .send(PublishedJob {
                push: push.clone(),
                job: job.clone(),
            })
            .await
            .map_err(|_| JobPublishError::Closed)
    }
}
