use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobQueue, QueueError};
use crate::domain::{
    EngineKind, Job, JobId, JobRecord, JobStatus, StoragePath, TranscriptionResult,
};

/// Job queue backed by a PostgreSQL table. Workers claim with
/// `FOR UPDATE SKIP LOCKED`, so any number of them can share one table.
pub struct PgJobQueue {
    pool: PgPool,
}

impl PgJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobQueue for PgJobQueue {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn enqueue(&self, job: &Job) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            INSERT INTO transcription_jobs
                (id, engine, language, model, artifact_path, status, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.engine.as_str())
        .bind(job.language.as_deref())
        .bind(&job.model)
        .bind(job.artifact.as_str())
        .bind(JobStatus::Queued.as_str())
        .bind(job.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn fetch(&self, id: JobId) -> Result<Option<JobRecord>, QueueError> {
        let row = sqlx::query(
            r#"
            SELECT id, engine, language, model, artifact_path, status, result, error,
                   worker, submitted_at, started_at, ended_at
            FROM transcription_jobs
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn claim_next(&self, worker: &str) -> Result<Option<Job>, QueueError> {
        loop {
            let row = sqlx::query(
                r#"
                UPDATE transcription_jobs
                SET status = 'started', started_at = NOW(), worker = $1
                WHERE id = (
                    SELECT id FROM transcription_jobs
                    WHERE status = 'queued'
                    ORDER BY submitted_at
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                RETURNING id, engine, language, model, artifact_path, submitted_at
                "#,
            )
            .bind(worker)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| QueueError::QueryFailed(e.to_string()))?;

            let Some(row) = row else {
                return Ok(None);
            };

            match job_from_row(&row) {
                Ok(job) => return Ok(Some(job)),
                Err(QueueError::Corrupt(reason)) => {
                    // The row is ours now; fail it so it cannot block the queue.
                    let id = JobId::from_uuid(column::<Uuid>(&row, "id")?);
                    tracing::error!(job_id = %id, reason = %reason, "Claimed unreadable job");
                    self.mark_failed(id, &reason).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    #[instrument(skip(self, result), fields(job_id = %id))]
    async fn mark_finished(
        &self,
        id: JobId,
        result: &TranscriptionResult,
    ) -> Result<(), QueueError> {
        let updated = sqlx::query(
            r#"
            UPDATE transcription_jobs
            SET status = 'finished', result = $2, error = NULL, ended_at = NOW()
            WHERE id = $1 AND status = 'started'
            "#,
        )
        .bind(id.as_uuid())
        .bind(Json(result))
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?
        .rows_affected();

        if updated == 0 {
            tracing::warn!("Ignored result for job that is not running");
        }
        Ok(())
    }

    #[instrument(skip(self, error), fields(job_id = %id))]
    async fn mark_failed(&self, id: JobId, error: &str) -> Result<(), QueueError> {
        let updated = sqlx::query(
            r#"
            UPDATE transcription_jobs
            SET status = 'failed', error = $2, result = NULL, ended_at = NOW()
            WHERE id = $1 AND status = 'started'
            "#,
        )
        .bind(id.as_uuid())
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?
        .rows_affected();

        if updated == 0 {
            tracing::warn!("Ignored failure for job that is not running");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, ended_before: DateTime<Utc>) -> Result<u64, QueueError> {
        let purged = sqlx::query(
            r#"
            DELETE FROM transcription_jobs
            WHERE status IN ('finished', 'failed') AND ended_at < $1
            "#,
        )
        .bind(ended_before)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?
        .rows_affected();

        Ok(purged)
    }

    #[instrument(skip(self, reason))]
    async fn fail_abandoned(
        &self,
        started_before: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, QueueError> {
        let failed = sqlx::query(
            r#"
            UPDATE transcription_jobs
            SET status = 'failed', error = $2, result = NULL, ended_at = NOW()
            WHERE status = 'started' AND started_at < $1
            "#,
        )
        .bind(started_before)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::QueryFailed(e.to_string()))?
        .rows_affected();

        Ok(failed)
    }

    async fn ping(&self) -> Result<(), QueueError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, QueueError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| QueueError::Corrupt(format!("{}: {}", name, e)))
}

fn job_from_row(row: &PgRow) -> Result<Job, QueueError> {
    let engine: String = column(row, "engine")?;
    let engine = engine
        .parse::<EngineKind>()
        .map_err(|_| QueueError::Corrupt(format!("unsupported engine: {}", engine)))?;

    Ok(Job {
        id: JobId::from_uuid(column(row, "id")?),
        engine,
        language: column(row, "language")?,
        model: column(row, "model")?,
        artifact: StoragePath::from_raw(column::<String>(row, "artifact_path")?),
        submitted_at: column(row, "submitted_at")?,
    })
}

fn record_from_row(row: &PgRow) -> Result<JobRecord, QueueError> {
    let status = column::<String>(row, "status")?
        .parse::<JobStatus>()
        .map_err(QueueError::Corrupt)?;
    let result: Option<Json<TranscriptionResult>> = column(row, "result")?;

    // Engine stays as text: a row claimed with an unknown engine is failed,
    // and that failure must remain readable.
    Ok(JobRecord {
        id: JobId::from_uuid(column(row, "id")?),
        engine: column(row, "engine")?,
        language: column(row, "language")?,
        model: column(row, "model")?,
        artifact: StoragePath::from_raw(column::<String>(row, "artifact_path")?),
        status,
        result: result.map(|r| r.0),
        error: column(row, "error")?,
        worker: column(row, "worker")?,
        submitted_at: column(row, "submitted_at")?,
        started_at: column(row, "started_at")?,
        ended_at: column(row, "ended_at")?,
    })
}
