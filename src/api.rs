//! HTTP API for the transit assistant

mod handlers;
mod types;

pub use handlers::create_router;

use crate::config::TransitConfig;
use crate::journey::JourneyContext;
use crate::messaging::{Dispatcher, MessagingService, TemplateRegistry};
use crate::runtime::{InMemorySessionStore, JourneyRuntime, ProductionRuntime, SessionStore};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ProductionRuntime>,
    pub messenger: Arc<dyn MessagingService>,
}

impl AppState {
    pub fn new(config: &TransitConfig, messenger: Arc<dyn MessagingService>) -> Self {
        let store = Arc::new(InMemorySessionStore::new(config.customer_name.clone()));
        Self::with_store(config, store, messenger)
    }

    pub fn with_store(
        config: &TransitConfig,
        store: Arc<dyn SessionStore>,
        messenger: Arc<dyn MessagingService>,
    ) -> Self {
        let dispatcher = Dispatcher::new(messenger.clone(), Arc::new(TemplateRegistry::new()));
        let runtime = JourneyRuntime::new(
            store,
            dispatcher,
            JourneyContext::new(config.timing.delays()),
        );

        Self {
            runtime: Arc::new(runtime),
            messenger,
        }
    }
}
