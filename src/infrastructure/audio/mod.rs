mod engine_registry;
mod engine_support;
mod mock_engine;
pub mod process;
mod timestamped_engine;
pub mod whisper_output;
mod whisperx_engine;

pub use engine_registry::EngineRegistry;
pub use engine_support::{scratch_dir, validate_audio};
pub use mock_engine::{MockEngineSelector, MockTranscriptionEngine};
pub use process::{CommandSpec, ENGINE_TIMEOUT, ProcessOutput, run_with_timeout};
pub use timestamped_engine::TimestampedEngine;
pub use whisperx_engine::{ALIGN_MODEL, DIARIZE_MODEL, WhisperXEngine};
