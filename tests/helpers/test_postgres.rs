use sqlx::PgPool;
use sqlx::postgres::PgConnectOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

use verbatim::infrastructure::persistence::{PgJobQueue, create_pool, run_migrations};

const USER: &str = "verbatim";
const PASSWORD: &str = "verbatim";
const DATABASE: &str = "verbatim_test";

/// Throwaway PostgreSQL with the job schema applied, connected the same way
/// the binaries connect (`create_pool` retries while the server starts).
pub struct TestPostgres {
    pub pool: PgPool,
    pub queue: PgJobQueue,
    _container: ContainerAsync<GenericImage>,
}

impl TestPostgres {
    pub async fn new() -> Self {
        let container = GenericImage::new("postgres", "16")
            .with_exposed_port(ContainerPort::Tcp(5432))
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_env_var("POSTGRES_USER", USER)
            .with_env_var("POSTGRES_PASSWORD", PASSWORD)
            .with_env_var("POSTGRES_DB", DATABASE)
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get PostgreSQL port");

        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(port)
            .username(USER)
            .password(PASSWORD)
            .database(DATABASE);

        let pool = create_pool(options, 4)
            .await
            .expect("PostgreSQL never accepted connections");
        run_migrations(&pool)
            .await
            .expect("Failed to apply job schema");

        Self {
            queue: PgJobQueue::new(pool.clone()),
            pool,
            _container: container,
        }
    }
}
