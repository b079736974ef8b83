//! Application state shared by every handler.

use skinstore_core::Config;
use skinstore_storage::FileStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn FileStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn FileStore>) -> Self {
        Self { config, store }
    }
}
