mod job_queue;
mod staging_store;
mod transcription_engine;

pub use job_queue::{JobQueue, QueueError};
pub use staging_store::{StagingStore, StagingStoreError};
pub use transcription_engine::{
    EngineOptions, EngineSelector, TranscriptionEngine, TranscriptionError, UnsupportedEngineError,
};
