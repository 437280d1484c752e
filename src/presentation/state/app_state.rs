use std::sync::Arc;

use crate::application::ports::JobQueue;
use crate::application::services::{JobDispatcher, StatusReporter};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<JobDispatcher>,
    pub reporter: Arc<StatusReporter>,
    pub queue: Arc<dyn JobQueue>,
}

impl AppState {
    pub fn new(dispatcher: JobDispatcher, queue: Arc<dyn JobQueue>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            reporter: Arc::new(StatusReporter::new(Arc::clone(&queue))),
            queue,
        }
    }
}
