use bytes::Bytes;
use futures::stream;

use verbatim::application::ports::{StagingStore, StagingStoreError};
use verbatim::domain::{JobId, StoragePath};

use crate::helpers::{create_test_store, file_count};

#[tokio::test]
async fn given_chunked_stream_when_storing_then_size_is_total_and_file_is_on_disk() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::new(&JobId::new(), "test.wav");

    let chunks = vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))];
    let size = store
        .store(&path, Box::pin(stream::iter(chunks)), None)
        .await
        .unwrap();

    assert_eq!(size, 11);
    assert_eq!(store.head(&path).await.unwrap(), 11);

    let local = store.local_path(&path).unwrap();
    assert_eq!(std::fs::read(&local).unwrap(), b"hello world");
    assert!(local.ends_with("test.wav"));
}

#[tokio::test]
async fn given_stored_file_when_deleting_then_file_and_job_directory_are_gone() {
    let (dir, store) = create_test_store();
    let path = StoragePath::new(&JobId::new(), "test.wav");
    store
        .store(&path, Box::pin(stream::iter(vec![Ok(Bytes::from("data"))])), None)
        .await
        .unwrap();

    store.delete(&path).await.unwrap();

    assert!(matches!(
        store.head(&path).await,
        Err(StagingStoreError::NotFound(_))
    ));
    assert_eq!(file_count(dir.path()), 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn given_missing_file_when_heading_then_not_found() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::new(&JobId::new(), "missing.wav");

    assert!(matches!(
        store.head(&path).await,
        Err(StagingStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_failing_stream_when_storing_then_io_error_is_returned() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::new(&JobId::new(), "broken.wav");

    let chunks = vec![
        Ok(Bytes::from("partial")),
        Err(std::io::Error::other("client disconnected")),
    ];
    let result = store.store(&path, Box::pin(stream::iter(chunks)), None).await;

    assert!(matches!(result, Err(StagingStoreError::Io(_))));
    assert!(matches!(
        store.head(&path).await,
        Err(StagingStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_sibling_in_job_directory_when_deleting_then_sibling_survives() {
    let (_dir, store) = create_test_store();
    let job_id = JobId::new();
    let first = StoragePath::new(&job_id, "first.wav");
    let second = StoragePath::new(&job_id, "second.wav");
    for path in [&first, &second] {
        let chunks = vec![Ok(Bytes::from("audio"))];
        store
            .store(path, Box::pin(stream::iter(chunks)), None)
            .await
            .unwrap();
    }

    store.delete(&first).await.unwrap();

    assert!(matches!(
        store.head(&first).await,
        Err(StagingStoreError::NotFound(_))
    ));
    assert_eq!(store.head(&second).await.unwrap(), 5);
}
