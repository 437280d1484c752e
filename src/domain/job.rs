use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{EngineKind, JobStatus, StoragePath, TranscriptionResult};

pub const DEFAULT_MODEL: &str = "base";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit of work handed to the queue. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub engine: EngineKind,
    pub language: Option<String>,
    pub model: String,
    pub artifact: StoragePath,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        id: JobId,
        engine: EngineKind,
        language: Option<String>,
        model: Option<String>,
        artifact: StoragePath,
    ) -> Self {
        Self {
            id,
            engine,
            language,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            artifact,
            submitted_at: Utc::now(),
        }
    }
}

/// Queue-side view of a job: what was submitted plus its current state.
///
/// The engine is kept as the stored text rather than an `EngineKind`, so a
/// job naming an engine this build cannot run still reports its failure.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: JobId,
    pub engine: String,
    pub language: Option<String>,
    pub model: String,
    pub artifact: StoragePath,
    pub status: JobStatus,
    pub result: Option<TranscriptionResult>,
    pub error: Option<String>,
    pub worker: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn queued(job: &Job) -> Self {
        Self {
            id: job.id,
            engine: job.engine.as_str().to_string(),
            language: job.language.clone(),
            model: job.model.clone(),
            artifact: job.artifact.clone(),
            status: JobStatus::Queued,
            result: None,
            error: None,
            worker: None,
            submitted_at: job.submitted_at,
            started_at: None,
            ended_at: None,
        }
    }
}
