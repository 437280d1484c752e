use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;

use crate::application::ports::{JobQueue, QueueError, StagingStore, StagingStoreError};
use crate::domain::{AudioFormat, EngineKind, Job, JobId, StoragePath};

/// An upload as received by the front door.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub data: Bytes,
    pub filename: String,
    pub engine: String,
    pub language: Option<String>,
    pub model: Option<String>,
}

pub struct JobDispatcher {
    queue: Arc<dyn JobQueue>,
    staging_store: Arc<dyn StagingStore>,
    max_file_size: u64,
}

impl JobDispatcher {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        staging_store: Arc<dyn StagingStore>,
        max_file_size: u64,
    ) -> Self {
        Self {
            queue,
            staging_store,
            max_file_size,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Checks format, engine and size, in that order. Has no side effects.
    pub fn validate(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<(AudioFormat, EngineKind), ValidationError> {
        let format = AudioFormat::from_filename(&request.filename)
            .ok_or_else(|| ValidationError::UnsupportedFormat(request.filename.clone()))?;

        let engine = request
            .engine
            .parse::<EngineKind>()
            .ok()
            .filter(EngineKind::is_production)
            .ok_or_else(|| ValidationError::InvalidEngine(request.engine.clone()))?;

        let size = request.data.len() as u64;
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok((format, engine))
    }

    #[tracing::instrument(
        skip(self, request),
        fields(filename = %request.filename, engine = %request.engine, bytes = request.data.len())
    )]
    pub async fn submit(&self, request: TranscriptionRequest) -> Result<JobId, DispatchError> {
        let (format, engine) = self.validate(&request).inspect_err(|e| {
            tracing::warn!(reason = %e, "Rejected transcription request");
        })?;

        let job_id = JobId::new();
        let artifact = StoragePath::new(&job_id, &request.filename);
        let size = request.data.len() as u64;

        let chunks = vec![Ok::<_, io::Error>(request.data)];
        self.staging_store
            .store(&artifact, Box::pin(stream::iter(chunks)), Some(size))
            .await
            .map_err(DispatchError::Staging)?;

        let job = Job::new(
            job_id,
            engine,
            non_blank(request.language),
            non_blank(request.model),
            artifact,
        );

        if let Err(e) = self.queue.enqueue(&job).await {
            if let Err(del_err) = self.staging_store.delete(&job.artifact).await {
                tracing::warn!(
                    error = %del_err,
                    path = %job.artifact,
                    "Failed to remove artifact after enqueue failure"
                );
            }
            return Err(DispatchError::Queue(e));
        }

        tracing::info!(
            job_id = %job_id,
            format = %format,
            model = %job.model,
            language = job.language.as_deref().unwrap_or("auto"),
            "Transcription job enqueued"
        );

        Ok(job_id)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported format: {0}. Allowed: mp3, wav, m4a, flac")]
    UnsupportedFormat(String),
    #[error("Invalid engine: {0}. Must be 'whisperx' or 'timestamped'")]
    InvalidEngine(String),
    #[error("File too large: {size} bytes. Max size: {} MB", .max / (1024 * 1024))]
    FileTooLarge { size: u64, max: u64 },
    #[error("No file uploaded")]
    MissingFile,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
    #[error("queue: {0}")]
    Queue(QueueError),
}
