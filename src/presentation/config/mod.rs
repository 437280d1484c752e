mod environment;
mod settings;

pub use environment::{Environment, EnvironmentError};
pub use settings::{
    DEFAULT_MAX_FILE_SIZE, EngineCommandSettings, EngineSettings, LoggingSettings,
    QueueSettings, ServerSettings, Settings, StorageSettings, UploadSettings, WorkerSettings,
};
