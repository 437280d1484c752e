mod in_memory_job_queue;
mod pg_job_queue;
mod pg_pool;

pub use in_memory_job_queue::InMemoryJobQueue;
pub use pg_job_queue::PgJobQueue;
pub use pg_pool::{create_pool, run_migrations};
