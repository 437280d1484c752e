use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;

use super::ErrorResponse;
use crate::application::services::{DispatchError, TranscriptionRequest, ValidationError};
use crate::domain::JobStatus;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub job_id: String,
    pub status: JobStatus,
}

#[derive(Default)]
struct TranscribeForm {
    file: Option<(String, Bytes)>,
    engine: Option<String>,
    language: Option<String>,
    model: Option<String>,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some((filename, data)) = form.file else {
        tracing::warn!("Transcription request with no file");
        return error_response(StatusCode::BAD_REQUEST, ValidationError::MissingFile.to_string());
    };

    let request = TranscriptionRequest {
        data,
        filename,
        engine: form.engine.unwrap_or_default(),
        language: form.language,
        model: form.model,
    };

    match state.dispatcher.submit(request).await {
        Ok(job_id) => {
            let mut response = (
                StatusCode::ACCEPTED,
                Json(TranscribeResponse {
                    job_id: job_id.to_string(),
                    status: JobStatus::Queued,
                }),
            )
                .into_response();
            response.extensions_mut().insert(job_id);
            response
        }
        Err(e) => {
            let status = dispatch_status(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "Failed to submit transcription job");
            }
            error_response(status, e.to_string())
        }
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<TranscribeForm, Response> {
    let mut form = TranscribeForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return Err(error_response(
                    e.status(),
                    format!("Failed to read multipart: {}", e.body_text()),
                ));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    tracing::warn!(error = %e, "Failed to read file bytes");
                    error_response(e.status(), format!("Failed to read file: {}", e.body_text()))
                })?;
                tracing::debug!(filename = %filename, bytes = data.len(), "File data received");
                form.file = Some((filename, data));
            }
            "engine" | "language" | "model" => {
                let value = field.text().await.map_err(|e| {
                    error_response(e.status(), format!("Failed to read {name}: {}", e.body_text()))
                })?;
                let slot = match name.as_str() {
                    "engine" => &mut form.engine,
                    "language" => &mut form.language,
                    _ => &mut form.model,
                };
                *slot = Some(value.trim().to_string());
            }
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn dispatch_status(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::Validation(ValidationError::UnsupportedFormat(_))
        | DispatchError::Validation(ValidationError::MissingFile) => StatusCode::BAD_REQUEST,
        DispatchError::Validation(ValidationError::InvalidEngine(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DispatchError::Validation(ValidationError::FileTooLarge { .. }) => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        DispatchError::Staging(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DispatchError::Queue(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}
