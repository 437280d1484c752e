use std::sync::Arc;

use bytes::Bytes;

use verbatim::application::ports::{JobQueue, StagingStore};
use verbatim::application::services::{
    DispatchError, JobDispatcher, TranscriptionRequest, ValidationError,
};
use verbatim::domain::{AudioFormat, EngineKind, JobStatus};

use crate::helpers::{create_test_queue, create_test_store, file_count};

const MAX_FILE_SIZE: u64 = 64;

fn request(filename: &str, engine: &str, data: &'static [u8]) -> TranscriptionRequest {
    TranscriptionRequest {
        data: Bytes::from_static(data),
        filename: filename.to_string(),
        engine: engine.to_string(),
        language: None,
        model: None,
    }
}

#[test]
fn given_bad_format_and_bad_engine_when_validating_then_format_is_reported_first() {
    let (_dir, store) = create_test_store();
    let dispatcher = JobDispatcher::new(create_test_queue(), store, MAX_FILE_SIZE);

    let err = dispatcher
        .validate(&request("notes.txt", "bogus", b"abc"))
        .unwrap_err();

    assert_eq!(err, ValidationError::UnsupportedFormat("notes.txt".to_string()));
}

#[test]
fn given_mock_or_unknown_engine_when_validating_then_engine_is_rejected() {
    let (_dir, store) = create_test_store();
    let dispatcher = JobDispatcher::new(create_test_queue(), store, MAX_FILE_SIZE);

    for engine in ["mock", "bogus", ""] {
        let err = dispatcher
            .validate(&request("test.wav", engine, b"abc"))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidEngine(engine.to_string()));
    }
}

#[test]
fn given_size_at_and_above_limit_when_validating_then_only_above_is_rejected() {
    let (_dir, store) = create_test_store();
    let dispatcher = JobDispatcher::new(create_test_queue(), store, 4);

    let (format, engine) = dispatcher
        .validate(&request("test.FLAC", "whisperx", b"1234"))
        .unwrap();
    assert_eq!(format, AudioFormat::Flac);
    assert_eq!(engine, EngineKind::WhisperX);

    let err = dispatcher
        .validate(&request("test.flac", "whisperx", b"12345"))
        .unwrap_err();
    assert_eq!(err, ValidationError::FileTooLarge { size: 5, max: 4 });
}

#[test]
fn given_oversize_error_when_displayed_then_limit_is_in_megabytes() {
    let err = ValidationError::FileTooLarge {
        size: 600 * 1024 * 1024,
        max: 500 * 1024 * 1024,
    };
    assert!(err.to_string().contains("Max size: 500 MB"));
}

#[tokio::test]
async fn given_rejected_request_when_submitting_then_nothing_is_stored_or_enqueued() {
    let (dir, store) = create_test_store();
    let queue = create_test_queue();
    let dispatcher = JobDispatcher::new(queue.clone(), store, MAX_FILE_SIZE);

    let result = dispatcher.submit(request("clip.ogg", "whisperx", b"abc")).await;

    assert!(matches!(
        result,
        Err(DispatchError::Validation(ValidationError::UnsupportedFormat(_)))
    ));
    assert!(queue.is_empty());
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn given_valid_request_when_submitting_then_job_is_queued_with_staged_artifact() {
    let (_dir, store) = create_test_store();
    let queue = create_test_queue();
    let dispatcher = JobDispatcher::new(queue.clone(), store.clone(), MAX_FILE_SIZE);

    let mut req = request("test.wav", "timestamped", b"RIFF....WAVE");
    req.language = Some("en".to_string());
    let job_id = dispatcher.submit(req).await.unwrap();

    let record = queue.fetch(job_id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Queued);
    assert_eq!(record.engine, EngineKind::Timestamped.as_str());
    assert_eq!(record.language.as_deref(), Some("en"));
    assert_eq!(record.model, "base");
    assert_eq!(record.artifact.file_name(), "test.wav");
    assert_eq!(store.head(&record.artifact).await.unwrap(), 12);
}

#[tokio::test]
async fn given_blank_language_and_model_when_submitting_then_defaults_apply() {
    let (_dir, store) = create_test_store();
    let queue = create_test_queue();
    let dispatcher = JobDispatcher::new(queue.clone(), store, MAX_FILE_SIZE);

    let mut req = request("test.mp3", "whisperx", b"ID3");
    req.language = Some("  ".to_string());
    req.model = Some(String::new());
    let job_id = dispatcher.submit(req).await.unwrap();

    let record = queue.fetch(job_id).await.unwrap().unwrap();
    assert!(record.language.is_none());
    assert_eq!(record.model, "base");
}

#[tokio::test]
async fn given_two_submissions_when_submitting_then_ids_are_distinct() {
    let (_dir, store) = create_test_store();
    let queue = create_test_queue();
    let dispatcher = JobDispatcher::new(queue.clone(), store, MAX_FILE_SIZE);

    let a = dispatcher.submit(request("a.wav", "whisperx", b"a")).await.unwrap();
    let b = dispatcher.submit(request("a.wav", "whisperx", b"b")).await.unwrap();

    assert_ne!(a, b);
    assert_eq!(queue.len(), 2);
}

#[tokio::test]
async fn given_queue_offline_when_submitting_then_queue_error_and_artifact_removed() {
    let (dir, store) = create_test_store();
    let queue = create_test_queue();
    queue.set_offline(true);
    let dispatcher = JobDispatcher::new(queue.clone() as Arc<dyn JobQueue>, store, MAX_FILE_SIZE);

    let result = dispatcher.submit(request("test.wav", "whisperx", b"abc")).await;

    assert!(matches!(result, Err(DispatchError::Queue(_))));
    assert_eq!(file_count(dir.path()), 0);
}
