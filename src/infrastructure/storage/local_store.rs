use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Upload directory on a filesystem shared by the API and the workers.
pub struct LocalStagingStore {
    inner: Arc<LocalFileSystem>,
    base_path: PathBuf,
}

impl LocalStagingStore {
    pub fn new(base_path: PathBuf) -> Result<Self, StagingStoreError> {
        std::fs::create_dir_all(&base_path).map_err(StagingStoreError::Io)?;
        let base_path = base_path.canonicalize().map_err(StagingStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            base_path,
        })
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }
}

fn not_found_or(e: object_store::Error, other: fn(String) -> StagingStoreError) -> StagingStoreError {
    match e {
        object_store::Error::NotFound { path, .. } => StagingStoreError::NotFound(path),
        e => other(e.to_string()),
    }
}

async fn abort_upload(upload: &mut dyn MultipartUpload, path: &StoragePath) {
    if let Err(e) = upload.abort().await {
        tracing::warn!(error = %e, path = %path, "Failed to abort partial upload");
    }
}

#[async_trait::async_trait]
impl StagingStore for LocalStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    abort_upload(upload.as_mut(), path).await;
                    return Err(StagingStoreError::Io(e));
                }
            };
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                abort_upload(upload.as_mut(), path).await;
                return Err(StagingStoreError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        tracing::debug!(path = %path, bytes = total_bytes, "Stored upload");
        Ok(total_bytes)
    }

    /// Removes the artifact and, when it is left empty, its per-job directory.
    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| not_found_or(e, StagingStoreError::DeleteFailed))?;

        if let Some(parent) = self.local_path(path)?.parent() {
            if parent != self.base_path {
                if let Err(e) = tokio::fs::remove_dir(parent).await {
                    // Expected when other files remain in the job directory.
                    tracing::debug!(error = %e, dir = %parent.display(), "Kept job directory");
                }
            }
        }
        Ok(())
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        let meta = self
            .inner
            .head(&store_path)
            .await
            .map_err(|e| not_found_or(e, StagingStoreError::ReadFailed))?;
        Ok(meta.size as u64)
    }

    fn local_path(&self, path: &StoragePath) -> Result<PathBuf, StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .path_to_filesystem(&store_path)
            .map_err(|e| StagingStoreError::InvalidPath(e.to_string()))
    }
}
