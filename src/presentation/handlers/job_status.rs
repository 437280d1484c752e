use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use super::ErrorResponse;
use crate::application::services::StatusError;
use crate::domain::{JobRecord, JobStatus, TranscriptionResult};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub result: Option<TranscriptionResult>,
    pub error: Option<String>,
    pub engine: String,
    pub model: String,
    pub language: Option<String>,
    pub worker: Option<String>,
    pub submitted_at: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl From<JobRecord> for JobStatusResponse {
    fn from(record: JobRecord) -> Self {
        Self {
            job_id: record.id.to_string(),
            status: record.status,
            result: record.result,
            error: record.error,
            engine: record.engine,
            model: record.model,
            language: record.language,
            worker: record.worker,
            submitted_at: record.submitted_at.to_rfc3339(),
            started_at: record.started_at.map(|t| t.to_rfc3339()),
            ended_at: record.ended_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match state.reporter.query(&job_id).await {
        Ok(record) => {
            let job_id = record.id;
            let mut response =
                (StatusCode::OK, Json(JobStatusResponse::from(record))).into_response();
            response.extensions_mut().insert(job_id);
            response
        }
        Err(e @ StatusError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
