use std::sync::Arc;

use crate::application::ports::{JobQueue, QueueError};
use crate::domain::{JobId, JobRecord};

/// Read-only view of job state as held by the queue.
pub struct StatusReporter {
    queue: Arc<dyn JobQueue>,
}

impl StatusReporter {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    /// Identifiers that are not UUIDs cannot have been issued, so they are
    /// reported as not found rather than malformed.
    #[tracing::instrument(skip(self))]
    pub async fn query(&self, job_id: &str) -> Result<JobRecord, StatusError> {
        let id = JobId::parse(job_id).ok_or_else(|| StatusError::NotFound(job_id.to_string()))?;

        self.queue
            .fetch(id)
            .await?
            .ok_or_else(|| StatusError::NotFound(job_id.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Job not found: {0}")]
    NotFound(String),
    #[error("Error fetching job status: {0}")]
    Queue(#[from] QueueError),
}
