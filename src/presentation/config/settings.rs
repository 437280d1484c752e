use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use super::Environment;
use crate::infrastructure::audio::ENGINE_TIMEOUT;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub queue: QueueSettings,
    pub storage: StorageSettings,
    pub upload: UploadSettings,
    pub worker: WorkerSettings,
    pub engines: EngineSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub poll_interval_ms: u64,
    /// Seconds a finished or failed job stays queryable. 0 keeps them forever.
    pub result_ttl_secs: u64,
}

impl QueueSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub upload_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub name: String,
    pub device: String,
    pub scratch_dir: String,
    /// Answer every job with the mock engine instead of spawning real ones.
    pub mock_engines: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    pub whisperx: EngineCommandSettings,
    pub timestamped: EngineCommandSettings,
    pub diarize: bool,
    pub vad_filter: bool,
    /// Per-invocation ceiling in seconds, capped at one hour. Must be positive.
    pub timeout_secs: u64,
}

impl EngineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs).min(ENGINE_TIMEOUT)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineCommandSettings {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.{environment}.toml` if present, then
    /// `APP__SECTION__KEY` variables, then the short legacy names
    /// (`QUEUE_HOST`, `UPLOAD_DIR`, `MAX_FILE_SIZE`, `WORKER_NAME`, `LOG_LEVEL`, ...).
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let legacy = |name: &str| std::env::var(name).ok();

        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("queue.host", "localhost")?
            .set_default("queue.port", 5432)?
            .set_default("queue.username", "verbatim")?
            .set_default("queue.password", "verbatim")?
            .set_default("queue.database", "verbatim")?
            .set_default("queue.max_connections", 5)?
            .set_default("queue.poll_interval_ms", 1000)?
            .set_default("queue.result_ttl_secs", 500)?
            .set_default("storage.upload_dir", "/tmp/uploads")?
            .set_default("upload.max_file_size", DEFAULT_MAX_FILE_SIZE as i64)?
            .set_default("worker.name", "default")?
            .set_default("worker.device", "cuda")?
            .set_default("worker.scratch_dir", std::env::temp_dir().to_string_lossy().into_owned())?
            .set_default("worker.mock_engines", false)?
            .set_default("engines.whisperx.program", "whisperx")?
            .set_default("engines.timestamped.program", "whisper-timestamped")?
            .set_default("engines.diarize", false)?
            .set_default("engines.vad_filter", true)?
            .set_default("engines.timeout_secs", 3600)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", environment.is_production())?
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("queue.host", legacy("QUEUE_HOST"))?
            .set_override_option("queue.port", legacy("QUEUE_PORT"))?
            .set_override_option("storage.upload_dir", legacy("UPLOAD_DIR"))?
            .set_override_option("upload.max_file_size", legacy("MAX_FILE_SIZE"))?
            .set_override_option("worker.name", legacy("WORKER_NAME"))?
            .set_override_option("logging.level", legacy("LOG_LEVEL"))?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values that would make every job fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engines.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "engines.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.upload.max_file_size == 0 {
            return Err(ConfigError::Message(
                "upload.max_file_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
