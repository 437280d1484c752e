use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

use super::TracingConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// JSON lines carry the enclosing span's fields (`request_id`, `job_id`,
/// `worker`), so API and worker logs for one job can be joined on `job_id`.
/// Fails if a subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let json = config.json_format.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
    });
    let plain = (!config.json_format).then(|| fmt::layer().compact().with_target(false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(plain)
        .try_init()?;

    tracing::info!(
        service = config.service,
        environment = %config.environment,
        level = %config.level,
        json = config.json_format,
        "Logging ready"
    );
    Ok(())
}
