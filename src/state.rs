use std::sync::Arc;

use crate::config::AppConfig;
use crate::notify::Notifier;
use crate::store::Stores;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub config: Arc<AppConfig>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let notifier = Notifier::new(config.notify.clone());
        Self {
            stores,
            config: Arc::new(config),
            notifier,
        }
    }
}
