mod job_dispatcher_test;
mod job_executor_test;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use verbatim::application::ports::{
    EngineOptions, EngineSelector, JobQueue, QueueError, TranscriptionEngine, TranscriptionError,
    UnsupportedEngineError,
};
use verbatim::domain::{Job, JobId, JobRecord, TranscriptionResult};
use verbatim::infrastructure::persistence::InMemoryJobQueue;

/// Engine that always fails the way a crashed CLI would.
pub struct FailingEngine;

#[async_trait]
impl TranscriptionEngine for FailingEngine {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn model(&self) -> &str {
        "base"
    }

    fn device(&self) -> &str {
        "cpu"
    }

    async fn run(
        &self,
        _audio_path: &Path,
        _language: Option<&str>,
        _options: &EngineOptions,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        Err(TranscriptionError::Execution {
            program: "whisperx".to_string(),
            status: "status 1".to_string(),
            diagnostics: "model weights missing".to_string(),
        })
    }
}

pub struct FailingSelector;

impl EngineSelector for FailingSelector {
    fn select(
        &self,
        _engine: &str,
        _model: &str,
    ) -> Result<Arc<dyn TranscriptionEngine>, UnsupportedEngineError> {
        Ok(Arc::new(FailingEngine))
    }
}

/// Queue whose first `failures` terminal writes fail as if the database
/// connection dropped, then behaves like the wrapped queue.
pub struct FlakyQueue {
    inner: Arc<InMemoryJobQueue>,
    failures: AtomicU32,
}

impl FlakyQueue {
    pub fn new(inner: Arc<InMemoryJobQueue>, failures: u32) -> Self {
        Self {
            inner,
            failures: AtomicU32::new(failures),
        }
    }

    fn trip(&self) -> Result<(), QueueError> {
        let tripped = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(QueueError::ConnectionFailed("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl JobQueue for FlakyQueue {
    async fn enqueue(&self, job: &Job) -> Result<(), QueueError> {
        self.inner.enqueue(job).await
    }

    async fn fetch(&self, id: JobId) -> Result<Option<JobRecord>, QueueError> {
        self.inner.fetch(id).await
    }

    async fn claim_next(&self, worker: &str) -> Result<Option<Job>, QueueError> {
        self.inner.claim_next(worker).await
    }

    async fn mark_finished(
        &self,
        id: JobId,
        result: &TranscriptionResult,
    ) -> Result<(), QueueError> {
        self.trip()?;
        self.inner.mark_finished(id, result).await
    }

    async fn mark_failed(&self, id: JobId, error: &str) -> Result<(), QueueError> {
        self.trip()?;
        self.inner.mark_failed(id, error).await
    }

    async fn purge_expired(&self, ended_before: DateTime<Utc>) -> Result<u64, QueueError> {
        self.inner.purge_expired(ended_before).await
    }

    async fn fail_abandoned(
        &self,
        started_before: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, QueueError> {
        self.inner.fail_abandoned(started_before, reason).await
    }

    async fn ping(&self) -> Result<(), QueueError> {
        self.inner.ping().await
    }
}
