use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn max_payload_bytes(&self) -> usize {
        self.config.server.api.max_payload_bytes.as_usize()
    }
}
