use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use verbatim::application::ports::{JobQueue, StagingStore};
use verbatim::application::services::JobDispatcher;
use verbatim::infrastructure::observability::{TracingConfig, init_tracing};
use verbatim::infrastructure::persistence::{PgJobQueue, create_pool, run_migrations};
use verbatim::infrastructure::storage::LocalStagingStore;
use verbatim::presentation::{AppState, Environment, Settings, create_router, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment)?;

    init_tracing(
        &TracingConfig::new("verbatim-api", environment.as_str())
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

    let dispatcher = JobDispatcher::new(
        Arc::clone(&queue),
        staging_store,
        settings.upload.max_file_size,
    );
    let router = create_router(AppState::new(dispatcher, queue));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!(
        %addr,
        upload_dir = %settings.storage.upload_dir,
        max_file_size = settings.upload.max_file_size,
        "Listening"
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
