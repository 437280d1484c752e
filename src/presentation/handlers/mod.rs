mod health;
mod job_status;
mod transcribe;

use serde::Serialize;

pub use health::{HealthResponse, health_handler};
pub use job_status::{JobStatusResponse, job_status_handler};
pub use transcribe::{TranscribeResponse, transcribe_handler};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
