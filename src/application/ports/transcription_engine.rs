use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::TranscriptionResult;

/// Engine-specific switches. Each engine reads the ones it understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Speaker diarization (whisperx).
    pub diarize: bool,
    /// Voice activity detection (whisper-timestamped).
    pub vad_filter: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            diarize: false,
            vad_filter: true,
        }
    }
}

/// A transcription engine behind the unified result schema.
///
/// Implementations hold configuration only and are cheap to build per job.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    fn device(&self) -> &str;

    async fn run(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        options: &EngineOptions,
    ) -> Result<TranscriptionResult, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("invalid audio input: {0}")]
    InvalidInput(String),
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {diagnostics}")]
    Execution {
        program: String,
        status: String,
        diagnostics: String,
    },
    #[error("{program} exceeded the {}s time limit", .limit.as_secs())]
    Timeout { program: String, limit: Duration },
    #[error("output file not generated: {}", .0.display())]
    OutputMissing(PathBuf),
    #[error("unreadable engine output: {0}")]
    MalformedOutput(String),
    #[error("scratch directory: {0}")]
    Scratch(#[source] io::Error),
}

/// Maps an engine name and model size to a ready-to-run engine.
pub trait EngineSelector: Send + Sync {
    fn select(
        &self,
        engine: &str,
        model: &str,
    ) -> Result<Arc<dyn TranscriptionEngine>, UnsupportedEngineError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported engine: {0}")]
pub struct UnsupportedEngineError(pub String);
