use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::ports::{JobQueue, QueueError};
use crate::domain::{Job, JobId, JobRecord, JobStatus, TranscriptionResult};

#[derive(Default)]
struct QueueState {
    records: HashMap<JobId, JobRecord>,
    pending: VecDeque<Job>,
}

/// Process-local queue with the same state rules as the durable one.
/// Useful for tests and single-process runs; nothing survives a restart.
#[derive(Default)]
pub struct InMemoryJobQueue {
    state: Mutex<QueueState>,
    offline: AtomicBool,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with `ConnectionFailed`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connected(&self) -> Result<(), QueueError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(QueueError::ConnectionFailed("queue offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn finish(
        &self,
        id: JobId,
        status: JobStatus,
        result: Option<TranscriptionResult>,
        error: Option<String>,
    ) -> Result<(), QueueError> {
        self.connected()?;
        let mut state = self.lock();
        match state.records.get_mut(&id) {
            Some(record) if record.status == JobStatus::Started => {
                record.status = status;
                record.result = result;
                record.error = error;
                record.ended_at = Some(Utc::now());
            }
            Some(record) => {
                tracing::warn!(job_id = %id, status = %record.status, "Ignored terminal write for job that is not running");
            }
            None => {
                tracing::warn!(job_id = %id, "Ignored terminal write for unknown job");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: &Job) -> Result<(), QueueError> {
        self.connected()?;
        let mut state = self.lock();
        if state.records.contains_key(&job.id) {
            return Err(QueueError::QueryFailed(format!("duplicate job id: {}", job.id)));
        }
        state.records.insert(job.id, JobRecord::queued(job));
        state.pending.push_back(job.clone());
        Ok(())
    }

    async fn fetch(&self, id: JobId) -> Result<Option<JobRecord>, QueueError> {
        self.connected()?;
        Ok(self.lock().records.get(&id).cloned())
    }

    async fn claim_next(&self, worker: &str) -> Result<Option<Job>, QueueError> {
        self.connected()?;
        let mut state = self.lock();
        while let Some(job) = state.pending.pop_front() {
            if let Some(record) = state.records.get_mut(&job.id) {
                if record.status == JobStatus::Queued {
                    record.status = JobStatus::Started;
                    record.worker = Some(worker.to_string());
                    record.started_at = Some(Utc::now());
                    return Ok(Some(job));
                }
            }
        }
        Ok(None)
    }

    async fn mark_finished(
        &self,
        id: JobId,
        result: &TranscriptionResult,
    ) -> Result<(), QueueError> {
        self.finish(id, JobStatus::Finished, Some(result.clone()), None)
    }

    async fn mark_failed(&self, id: JobId, error: &str) -> Result<(), QueueError> {
        self.finish(id, JobStatus::Failed, None, Some(error.to_string()))
    }

    async fn purge_expired(&self, ended_before: DateTime<Utc>) -> Result<u64, QueueError> {
        self.connected()?;
        let mut state = self.lock();
        let before = state.records.len();
        state.records.retain(|_, record| {
            !(record.status.is_terminal() && record.ended_at.is_some_and(|at| at < ended_before))
        });
        Ok((before - state.records.len()) as u64)
    }

    async fn fail_abandoned(
        &self,
        started_before: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, QueueError> {
        self.connected()?;
        let mut state = self.lock();
        let now = Utc::now();
        let mut failed = 0;
        for record in state.records.values_mut() {
            if record.status == JobStatus::Started
                && record.started_at.is_some_and(|at| at < started_before)
            {
                record.status = JobStatus::Failed;
                record.result = None;
                record.error = Some(reason.to_string());
                record.ended_at = Some(now);
                failed += 1;
            }
        }
        Ok(failed)
    }

    async fn ping(&self) -> Result<(), QueueError> {
        self.connected()
    }
}
