use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use super::engine_support::{scratch_dir, validate_audio};
use super::process::{CommandSpec, ENGINE_TIMEOUT, run_with_timeout};
use super::whisper_output::{output_path, read_output};
use crate::application::ports::{EngineOptions, TranscriptionEngine, TranscriptionError};
use crate::domain::TranscriptionResult;

/// whisper-timestamped: lightweight word-timestamped transcription.
pub struct TimestampedEngine {
    model: String,
    device: String,
    command: CommandSpec,
    scratch_root: PathBuf,
    timeout: Duration,
}

impl TimestampedEngine {
    pub fn new(model: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            device: device.into(),
            command: CommandSpec::new("whisper-timestamped"),
            scratch_root: std::env::temp_dir().join("timestamped_output"),
            timeout: ENGINE_TIMEOUT,
        }
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.command = command;
        self
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build_args(
        &self,
        audio_path: &Path,
        output_dir: &Path,
        language: Option<&str>,
        options: &EngineOptions,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            audio_path.into(),
            "--model".into(),
            self.model.as_str().into(),
            "--device".into(),
            self.device.as_str().into(),
            "--output_format".into(),
            "json".into(),
            "--output_dir".into(),
            output_dir.into(),
        ];

        if let Some(lang) = language {
            args.push("--language".into());
            args.push(lang.into());
        }

        // VAD is on by default in the tool itself.
        if !options.vad_filter {
            args.push("--no_vad".into());
        }

        args
    }
}

#[async_trait]
impl TranscriptionEngine for TimestampedEngine {
    fn name(&self) -> &'static str {
        "timestamped"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn device(&self) -> &str {
        &self.device
    }

    async fn run(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        options: &EngineOptions,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        validate_audio(audio_path).await?;

        let scratch = scratch_dir(&self.scratch_root)?;
        let args = self.build_args(audio_path, scratch.path(), language, options);

        tracing::debug!(
            program = %self.command.program,
            model = %self.model,
            device = %self.device,
            vad_filter = options.vad_filter,
            "Launching whisper-timestamped"
        );

        run_with_timeout(&self.command, &args, self.timeout).await?;

        let result = read_output(&output_path(scratch.path(), audio_path), self.name()).await?;

        tracing::info!(
            segments = result.segments.len(),
            language = %result.language,
            "whisper-timestamped transcription completed"
        );

        Ok(result)
    }
}
