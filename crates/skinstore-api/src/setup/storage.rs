//! Storage setup and initialization

use anyhow::{Context, Result};
use skinstore_core::Config;
use skinstore_storage::{create_store, FileStore};
use std::sync::Arc;

/// Create the storage directory if needed and build the file store over it.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn FileStore>> {
    tracing::info!(path = %config.storage_path().display(), "Initializing file store...");
    let store = create_store(config).await.with_context(|| {
        format!(
            "Failed to initialize storage at {}",
            config.storage_path().display()
        )
    })?;
    Ok(store)
}
