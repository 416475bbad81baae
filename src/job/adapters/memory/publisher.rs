//! In-memory job publisher recording every published job.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::job::{
    adapters::PublishedJob,
    domain::{JobRecord, PushInfo},
    ports::{JobPublishError, JobPublishResult, JobPublisher},
};

/// Thread-safe publisher that keeps published jobs in arrival order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobPublisher {
    published: Arc<RwLock<Vec<PublishedJob>>>,
}

impl InMemoryJobPublisher {
    /// Creates an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything published so far.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedJob> {
        self.published
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Returns the jobs published for one job GUID, in publication order.
    #[must_use]
    pub fn history(&self, job_guid: &str) -> Vec<JobRecord> {
        self.published
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.job.job_guid() == job_guid)
            .map(|entry| entry.job.clone())
            .collect()
    }
}

#[async_trait]
impl JobPublisher for InMemoryJobPublisher {
    async fn publish(&self, push: &PushInfo, job: &JobRecord) -> JobPublishResult<()> {
        let mut published = self
            .published
            .write()
            .map_err(|err| JobPublishError::transport(std::io::Error::other(err.to_string())))?;
        published.push(PublishedJob {
            push: push.clone(),
            job: job.clone(),
        });
        Ok(())
    }
}
