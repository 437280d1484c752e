use std::sync::Arc;

use crate::application::ports::{
    EngineOptions, EngineSelector, StagingStore, StagingStoreError, TranscriptionError,
    UnsupportedEngineError,
};
use crate::domain::{Job, StoragePath, TranscriptionResult};

/// Runs one dequeued job to completion inside a worker.
pub struct JobExecutor {
    selector: Arc<dyn EngineSelector>,
    staging_store: Arc<dyn StagingStore>,
    options: EngineOptions,
}

impl JobExecutor {
    pub fn new(
        selector: Arc<dyn EngineSelector>,
        staging_store: Arc<dyn StagingStore>,
        options: EngineOptions,
    ) -> Self {
        Self {
            selector,
            staging_store,
            options,
        }
    }

    /// Transcribes the job's artifact and deletes it afterwards, whatever the
    /// outcome. Deletion failures are logged and never change the result.
    pub async fn execute(&self, job: &Job) -> Result<TranscriptionResult, JobExecutionError> {
        let outcome = self.transcribe(job).await;
        self.cleanup(&job.artifact).await;
        outcome
    }

    async fn transcribe(&self, job: &Job) -> Result<TranscriptionResult, JobExecutionError> {
        match self.staging_store.head(&job.artifact).await {
            Ok(_) => {}
            Err(StagingStoreError::NotFound(_)) => {
                return Err(JobExecutionError::MissingArtifact(job.artifact.to_string()));
            }
            Err(e) => return Err(JobExecutionError::Staging(e)),
        }

        let audio_path = self
            .staging_store
            .local_path(&job.artifact)
            .map_err(JobExecutionError::Staging)?;

        let engine = self.selector.select(job.engine.as_str(), &job.model)?;

        tracing::debug!(
            engine = engine.name(),
            model = engine.model(),
            device = engine.device(),
            path = %audio_path.display(),
            "Starting transcription"
        );

        engine
            .run(&audio_path, job.language.as_deref(), &self.options)
            .await
            .map_err(JobExecutionError::TranscriptionFailed)
    }

    async fn cleanup(&self, artifact: &StoragePath) {
        match self.staging_store.delete(artifact).await {
            Ok(()) => tracing::debug!(path = %artifact, "Cleaned up audio file"),
            Err(StagingStoreError::NotFound(_)) => {
                tracing::debug!(path = %artifact, "Audio file already gone")
            }
            Err(e) => tracing::warn!(
                error = %e,
                path = %artifact,
                "Failed to clean up audio file"
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    #[error("Audio file not found: {0}")]
    MissingArtifact(String),
    #[error(transparent)]
    UnsupportedEngine(#[from] UnsupportedEngineError),
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(#[source] TranscriptionError),
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
}
