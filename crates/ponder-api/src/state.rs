use ponder_persist::PersistenceClient;
use ponder_session::TurnRunner;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The store is the single source of truth; the runner owns the in-flight
/// turn registry, so one instance is shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PersistenceClient>,
    pub runner: TurnRunner,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PersistenceClient>, runner: TurnRunner) -> Self {
        Self {
            config: Arc::new(config),
            store,
            runner,
        }
    }
}
