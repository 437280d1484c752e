use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{EngineSelector, TranscriptionEngine, UnsupportedEngineError};
use crate::domain::EngineKind;
use crate::presentation::config::{EngineCommandSettings, EngineSettings, WorkerSettings};

use super::mock_engine::MockTranscriptionEngine;
use super::process::{CommandSpec, ENGINE_TIMEOUT};
use super::timestamped_engine::TimestampedEngine;
use super::whisperx_engine::WhisperXEngine;

/// Builds a fresh engine per call from the worker's device, commands and
/// scratch location. Holds no per-job state.
#[derive(Debug, Clone)]
pub struct EngineRegistry {
    device: String,
    scratch_root: PathBuf,
    whisperx_command: CommandSpec,
    timestamped_command: CommandSpec,
    timeout: Duration,
}

impl EngineRegistry {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            scratch_root: std::env::temp_dir(),
            whisperx_command: CommandSpec::new("whisperx"),
            timestamped_command: CommandSpec::new("whisper-timestamped"),
            timeout: ENGINE_TIMEOUT,
        }
    }

    pub fn from_settings(worker: &WorkerSettings, engines: &EngineSettings) -> Self {
        Self::new(worker.device.as_str())
            .with_scratch_root(&worker.scratch_dir)
            .with_whisperx_command(command_from(&engines.whisperx))
            .with_timestamped_command(command_from(&engines.timestamped))
            .with_timeout(engines.timeout())
    }

    /// Engines write under `{root}/{engine}_output/`.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    pub fn with_whisperx_command(mut self, command: CommandSpec) -> Self {
        self.whisperx_command = command;
        self
    }

    pub fn with_timestamped_command(mut self, command: CommandSpec) -> Self {
        self.timestamped_command = command;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn command_from(settings: &EngineCommandSettings) -> CommandSpec {
    CommandSpec::new(settings.program.as_str()).with_leading_args(settings.args.iter().cloned())
}

impl EngineSelector for EngineRegistry {
    fn select(
        &self,
        engine: &str,
        model: &str,
    ) -> Result<Arc<dyn TranscriptionEngine>, UnsupportedEngineError> {
        let kind = engine
            .parse::<EngineKind>()
            .map_err(|_| UnsupportedEngineError(engine.to_string()))?;

        let selected: Arc<dyn TranscriptionEngine> = match kind {
            EngineKind::WhisperX => Arc::new(
                WhisperXEngine::new(model, self.device.as_str())
                    .with_command(self.whisperx_command.clone())
                    .with_scratch_root(self.scratch_root.join("whisperx_output"))
                    .with_timeout(self.timeout),
            ),
            EngineKind::Timestamped => Arc::new(
                TimestampedEngine::new(model, self.device.as_str())
                    .with_command(self.timestamped_command.clone())
                    .with_scratch_root(self.scratch_root.join("timestamped_output"))
                    .with_timeout(self.timeout),
            ),
            EngineKind::Mock => Arc::new(MockTranscriptionEngine::new(model)),
        };

        Ok(selected)
    }
}
