//! Shared application state handed to every API handler

use barrage_core::domain::profile::ProfileLimits;
use barrage_core::store::JobStore;
use barrage_runner::{BatchScheduler, CancelToken, RequestExecutor};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::OrchestratorConfig;

/// Cancellation tokens of jobs whose scheduler task is still alive
#[derive(Debug, Default)]
pub struct ActiveJobs {
    tokens: Mutex<HashMap<Uuid, CancelToken>>,
}

impl ActiveJobs {
    pub fn insert(&self, id: Uuid, token: CancelToken) {
        self.tokens.lock().insert(id, token);
    }

    pub fn get(&self, id: Uuid) -> Option<CancelToken> {
        self.tokens.lock().get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) {
        self.tokens.lock().remove(&id);
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.lock().is_empty()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub scheduler: Arc<BatchScheduler>,
    pub active: Arc<ActiveJobs>,
    pub limits: ProfileLimits,
}

impl AppState {
    pub fn new(
        store: Arc<dyn JobStore>,
        executor: Arc<dyn RequestExecutor>,
        config: &OrchestratorConfig,
    ) -> Self {
        let scheduler = BatchScheduler::new(executor, Arc::clone(&store), &config.runner);
        Self {
            store,
            scheduler: Arc::new(scheduler),
            active: Arc::new(ActiveJobs::default()),
            limits: config.limits,
        }
    }
}
