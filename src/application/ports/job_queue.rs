use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Job, JobId, JobRecord, TranscriptionResult};

/// Durable work queue and the single source of truth for job state.
///
/// State only moves forward: queued → started → finished | failed. Terminal
/// writes against a job that is not `started` are ignored.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: &Job) -> Result<(), QueueError>;

    async fn fetch(&self, id: JobId) -> Result<Option<JobRecord>, QueueError>;

    /// Atomically moves the oldest queued job to `started` on behalf of `worker`.
    async fn claim_next(&self, worker: &str) -> Result<Option<Job>, QueueError>;

    async fn mark_finished(
        &self,
        id: JobId,
        result: &TranscriptionResult,
    ) -> Result<(), QueueError>;

    async fn mark_failed(&self, id: JobId, error: &str) -> Result<(), QueueError>;

    /// Drops terminal records that ended before `ended_before`. Returns how many.
    async fn purge_expired(&self, ended_before: DateTime<Utc>) -> Result<u64, QueueError>;

    /// Fails jobs still `started` that were claimed before `started_before`,
    /// recording `reason` as their error. Covers workers that died mid-job or
    /// never managed to record an outcome. Returns how many.
    async fn fail_abandoned(
        &self,
        started_before: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, QueueError>;

    async fn ping(&self) -> Result<(), QueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("corrupt job record: {0}")]
    Corrupt(String),
}
