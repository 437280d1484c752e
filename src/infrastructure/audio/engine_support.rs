use std::path::Path;

use tempfile::TempDir;

use crate::application::ports::TranscriptionError;

/// The audio must exist, be a regular file and be non-empty.
pub async fn validate_audio(path: &Path) -> Result<(), TranscriptionError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        Ok(_) => Err(TranscriptionError::InvalidInput(format!(
            "empty or not a file: {}",
            path.display()
        ))),
        Err(e) => Err(TranscriptionError::InvalidInput(format!(
            "{}: {}",
            path.display(),
            e
        ))),
    }
}

/// Fresh output directory for one invocation, removed when dropped.
pub fn scratch_dir(root: &Path) -> Result<TempDir, TranscriptionError> {
    std::fs::create_dir_all(root).map_err(TranscriptionError::Scratch)?;
    tempfile::Builder::new()
        .prefix("run-")
        .tempdir_in(root)
        .map_err(TranscriptionError::Scratch)
}
