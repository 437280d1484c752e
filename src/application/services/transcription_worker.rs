use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::watch;
use tracing::Instrument;

use super::job_executor::JobExecutor;
use crate::application::ports::{JobQueue, QueueError};
use crate::domain::{Job, TranscriptionResult};

const TERMINAL_WRITE_ATTEMPTS: u32 = 5;
const TERMINAL_WRITE_BACKOFF: Duration = Duration::from_millis(250);
const ABANDON_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Added to the engine ceiling before a `started` job counts as abandoned.
pub const ABANDON_GRACE: Duration = Duration::from_secs(300);

/// Pulls one job at a time from the queue and records its terminal state.
pub struct TranscriptionWorker {
    name: String,
    queue: Arc<dyn JobQueue>,
    executor: JobExecutor,
    poll_interval: Duration,
    result_ttl: Option<Duration>,
    abandon_after: Option<Duration>,
}

impl TranscriptionWorker {
    pub fn new(
        name: impl Into<String>,
        queue: Arc<dyn JobQueue>,
        executor: JobExecutor,
        poll_interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            executor,
            poll_interval,
            result_ttl: None,
            abandon_after: None,
        }
    }

    /// Terminal records older than `ttl` are purged while the worker runs.
    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = Some(ttl);
        self
    }

    /// Jobs left `started` for longer than `after` (by any worker) are failed
    /// while this worker runs. Must exceed the engine ceiling.
    pub fn with_abandon_after(mut self, after: Duration) -> Self {
        self.abandon_after = Some(after);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs until `shutdown` flips to true. A job in progress always finishes
    /// before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(worker = %self.name, "Transcription worker started");
        let mut last_purge: Option<Instant> = None;
        let mut last_sweep: Option<Instant> = None;

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Some(ttl) = self.result_ttl {
                if last_purge.is_none_or(|at| at.elapsed() >= ttl) {
                    self.purge_expired(ttl).await;
                    last_purge = Some(Instant::now());
                }
            }

            if let Some(after) = self.abandon_after {
                let every = after.min(ABANDON_SWEEP_INTERVAL);
                if last_sweep.is_none_or(|at| at.elapsed() >= every) {
                    self.fail_abandoned(after).await;
                    last_sweep = Some(Instant::now());
                }
            }

            let busy = match self.run_once().await {
                Ok(processed) => processed,
                Err(e) => {
                    tracing::error!(error = %e, "Worker iteration failed");
                    false
                }
            };

            if !busy {
                tokio::select! {
                    _ = shutdown.changed() => {}
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }

        tracing::info!(worker = %self.name, "Transcription worker stopped");
    }

    /// Claims and processes at most one job. Returns whether a job was found.
    pub async fn run_once(&self) -> Result<bool, WorkerError> {
        let Some(job) = self.queue.claim_next(&self.name).await? else {
            return Ok(false);
        };

        let span = tracing::info_span!(
            "transcription_job",
            job_id = %job.id,
            engine = %job.engine,
            model = %job.model,
            worker = %self.name,
        );

        self.process_job(job).instrument(span).await?;
        Ok(true)
    }

    async fn process_job(&self, job: Job) -> Result<(), WorkerError> {
        tracing::info!("Starting transcription job");
        let started = Instant::now();

        match self.executor.execute(&job).await {
            Ok(result) => {
                self.record(Outcome::Finished(&result), &job).await?;
                tracing::info!(
                    segments = result.segments.len(),
                    language = %result.language,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Completed transcription job"
                );
            }
            Err(e) => {
                let error_msg = e.to_string();
                tracing::error!(
                    error = %error_msg,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Transcription job failed"
                );
                self.record(Outcome::Failed(&error_msg), &job).await?;
            }
        }

        Ok(())
    }

    /// Terminal writes are retried with exponential backoff; the artifact is
    /// already gone, so a lost write would lose the outcome. If every attempt
    /// fails the job stays `started` until an abandon sweep fails it.
    async fn record(&self, outcome: Outcome<'_>, job: &Job) -> Result<(), QueueError> {
        let mut delay = TERMINAL_WRITE_BACKOFF;
        let mut attempt = 1;
        loop {
            let written = match outcome {
                Outcome::Finished(result) => self.queue.mark_finished(job.id, result).await,
                Outcome::Failed(error) => self.queue.mark_failed(job.id, error).await,
            };
            match written {
                Ok(()) => return Ok(()),
                Err(e) if attempt < TERMINAL_WRITE_ATTEMPTS => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        "Failed to record job outcome, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, attempts = attempt, "Gave up recording job outcome");
                    return Err(e);
                }
            }
        }
    }

    async fn fail_abandoned(&self, after: Duration) {
        let Ok(age) = chrono::Duration::from_std(after) else {
            return;
        };
        let reason = format!(
            "job abandoned: no outcome recorded within {}s of being claimed",
            after.as_secs()
        );
        match self.queue.fail_abandoned(Utc::now() - age, &reason).await {
            Ok(0) => {}
            Ok(failed) => tracing::warn!(failed, "Failed abandoned jobs"),
            Err(e) => tracing::warn!(error = %e, "Failed to sweep abandoned jobs"),
        }
    }

    async fn purge_expired(&self, ttl: Duration) {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return;
        };
        match self.queue.purge_expired(Utc::now() - ttl).await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "Purged expired job records"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired job records"),
        }
    }
}

#[derive(Clone, Copy)]
enum Outcome<'a> {
    Finished(&'a TranscriptionResult),
    Failed(&'a str),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("queue: {0}")]
    Queue(#[from] QueueError),
}
