mod audio_format;
mod engine_kind;
mod job;
mod job_status;
mod storage_path;
mod transcription;

pub use audio_format::AudioFormat;
pub use engine_kind::EngineKind;
pub use job::{DEFAULT_MODEL, Job, JobId, JobRecord};
pub use job_status::JobStatus;
pub use storage_path::StoragePath;
pub use transcription::{TranscriptionResult, TranscriptionSegment, UNKNOWN_LANGUAGE, Word};
