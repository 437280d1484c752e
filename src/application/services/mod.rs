mod job_dispatcher;
mod job_executor;
mod status_reporter;
mod transcription_worker;

pub use job_dispatcher::{DispatchError, JobDispatcher, TranscriptionRequest, ValidationError};
pub use job_executor::{JobExecutionError, JobExecutor};
pub use status_reporter::{StatusError, StatusReporter};
pub use transcription_worker::{ABANDON_GRACE, TranscriptionWorker, WorkerError};
