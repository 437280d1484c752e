use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use verbatim::application::ports::{EngineOptions, EngineSelector, JobQueue, StagingStore};
use verbatim::application::services::{ABANDON_GRACE, JobExecutor, TranscriptionWorker};
use verbatim::infrastructure::audio::{EngineRegistry, MockEngineSelector};
use verbatim::infrastructure::observability::{TracingConfig, init_tracing};
use verbatim::infrastructure::persistence::{PgJobQueue, create_pool, run_migrations};
use verbatim::infrastructure::storage::LocalStagingStore;
use verbatim::presentation::{Environment, Settings, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment)?;

    init_tracing(
        &TracingConfig::new("verbatim-worker", environment.as_str())
            .with_json(settings.logging.json)
            .with_level(settings.logging.level.as_str()),
    )?;

    let pool = create_pool(
        settings.queue.connect_options(),
        settings.queue.max_connections,
    )
    .await?;
    run_migrations(&pool).await?;

    let queue: Arc<dyn JobQueue> = Arc::new(PgJobQueue::new(pool));
    let staging_store: Arc<dyn StagingStore> = Arc::new(LocalStagingStore::new(PathBuf::from(
        &settings.storage.upload_dir,
    ))?);

    let selector: Arc<dyn EngineSelector> = if settings.worker.mock_engines {
        tracing::warn!("Mock engines enabled; no real transcription will run");
        Arc::new(MockEngineSelector)
    } else {
        Arc::new(EngineRegistry::from_settings(
            &settings.worker,
            &settings.engines,
        ))
    };

    let options = EngineOptions {
        diarize: settings.engines.diarize,
        vad_filter: settings.engines.vad_filter,
    };
    let executor = JobExecutor::new(selector, staging_store, options);

    let mut worker = TranscriptionWorker::new(
        settings.worker.name.as_str(),
        queue,
        executor,
        Duration::from_millis(settings.queue.poll_interval_ms),
    )
    .with_abandon_after(settings.engines.timeout() + ABANDON_GRACE);
    if settings.queue.result_ttl_secs > 0 {
        worker = worker.with_result_ttl(Duration::from_secs(settings.queue.result_ttl_secs));
    }

    tracing::info!(
        worker = %settings.worker.name,
        device = %settings.worker.device,
        mock_engines = settings.worker.mock_engines,
        engine_timeout_secs = settings.engines.timeout().as_secs(),
        "Worker configured"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Finishing current job before exit");
        let _ = shutdown_tx.send(true);
    });

    worker.run(shutdown_rx).await;

    Ok(())
}
