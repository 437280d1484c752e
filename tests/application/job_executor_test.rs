use std::sync::Arc;

use verbatim::application::ports::{EngineOptions, StagingStore, StagingStoreError};
use verbatim::application::services::{JobExecutionError, JobExecutor};
use verbatim::domain::{EngineKind, Job, JobId, StoragePath};
use verbatim::infrastructure::audio::MockEngineSelector;

use super::FailingSelector;
use crate::helpers::{create_test_store, file_count, staged_job};

#[tokio::test]
async fn given_staged_audio_when_executing_then_result_names_file_and_artifact_is_removed() {
    let (dir, store) = create_test_store();
    let job = staged_job(&store, "test.wav", EngineKind::Timestamped, b"audio").await;
    let executor = JobExecutor::new(
        Arc::new(MockEngineSelector),
        store.clone(),
        EngineOptions::default(),
    );

    let result = executor.execute(&job).await.unwrap();

    assert_eq!(result.engine, "mock");
    assert_eq!(result.language, "en");
    assert!(result.text.contains("test"));
    assert!(matches!(
        store.head(&job.artifact).await,
        Err(StagingStoreError::NotFound(_))
    ));
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn given_job_language_when_executing_then_language_is_passed_to_engine() {
    let (_dir, store) = create_test_store();
    let mut job = staged_job(&store, "talk.mp3", EngineKind::WhisperX, b"audio").await;
    job.language = Some("nb".to_string());
    let executor = JobExecutor::new(Arc::new(MockEngineSelector), store, EngineOptions::default());

    let result = executor.execute(&job).await.unwrap();

    assert_eq!(result.language, "nb");
}

#[tokio::test]
async fn given_missing_artifact_when_executing_then_fails_with_missing_audio() {
    let (_dir, store) = create_test_store();
    let id = JobId::new();
    let job = Job::new(id, EngineKind::WhisperX, None, None, StoragePath::new(&id, "gone.wav"));
    let executor = JobExecutor::new(Arc::new(MockEngineSelector), store, EngineOptions::default());

    let err = executor.execute(&job).await.unwrap_err();

    assert!(matches!(err, JobExecutionError::MissingArtifact(_)));
    assert!(err.to_string().starts_with("Audio file not found"));
}

#[tokio::test]
async fn given_engine_failure_when_executing_then_error_carries_diagnostics_and_artifact_is_removed()
{
    let (dir, store) = create_test_store();
    let job = staged_job(&store, "test.wav", EngineKind::WhisperX, b"audio").await;
    let executor = JobExecutor::new(Arc::new(FailingSelector), store, EngineOptions::default());

    let err = executor.execute(&job).await.unwrap_err();

    assert!(matches!(err, JobExecutionError::TranscriptionFailed(_)));
    assert!(err.to_string().contains("model weights missing"));
    assert_eq!(file_count(dir.path()), 0);
}
