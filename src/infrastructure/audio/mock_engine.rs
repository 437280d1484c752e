use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::engine_support::validate_audio;
use crate::application::ports::{
    EngineOptions, EngineSelector, TranscriptionEngine, TranscriptionError, UnsupportedEngineError,
};
use crate::domain::{TranscriptionResult, TranscriptionSegment, Word};

/// Deterministic engine that never spawns a process. The transcript names the
/// input file so callers can check it went through the pipeline.
pub struct MockTranscriptionEngine {
    model: String,
}

impl MockTranscriptionEngine {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn device(&self) -> &str {
        "cpu"
    }

    async fn run(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        _options: &EngineOptions,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        validate_audio(audio_path).await?;

        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let segments = vec![
            TranscriptionSegment::new(
                0,
                0.0,
                2.5,
                "This is a mock transcription",
                vec![
                    Word::new("This", 0.0, 0.4),
                    Word::new("is", 0.5, 0.7),
                    Word::new("a", 0.8, 0.9),
                    Word::new("mock", 1.0, 1.3),
                    Word::new("transcription", 1.4, 2.5),
                ],
            ),
            TranscriptionSegment::new(
                1,
                2.5,
                5.0,
                &format!("from the file {}", stem),
                vec![
                    Word::new("from", 2.5, 2.8),
                    Word::new("the", 2.9, 3.0),
                    Word::new("file", 3.1, 3.4),
                    Word::new(stem.as_str(), 3.5, 4.5),
                ],
            ),
        ];

        Ok(TranscriptionResult::assemble(
            None,
            segments,
            Some(language.unwrap_or("en")),
            self.name(),
        ))
    }
}

/// Selector that answers every engine name with the mock engine, for running
/// the pipeline on hosts without real engines installed.
pub struct MockEngineSelector;

impl EngineSelector for MockEngineSelector {
    fn select(
        &self,
        engine: &str,
        model: &str,
    ) -> Result<Arc<dyn TranscriptionEngine>, UnsupportedEngineError> {
        tracing::debug!(requested = %engine, "Substituting mock engine");
        Ok(Arc::new(MockTranscriptionEngine::new(model)))
    }
}
