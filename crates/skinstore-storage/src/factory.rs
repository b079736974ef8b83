use crate::{FileStore, LocalFileStore, StorageResult};
use skinstore_core::Config;
use std::sync::Arc;

/// Create the file store described by the configuration.
pub async fn create_store(config: &Config) -> StorageResult<Arc<dyn FileStore>> {
    let store = LocalFileStore::new(config.storage_path(), config.files_base_url())
        .await?
        .with_allowed_content_types(config.allowed_content_types())
        .with_resolve_extensions(config.resolve_extensions().iter().cloned())
        .with_update_target(config.update_target());

    tracing::info!(
        path = %store.base_path().display(),
        base_url = %config.files_base_url(),
        resolve_extensions = %config.resolve_extensions().join(","),
        allowed_content_types = %config.allowed_content_types().join(","),
        update_target = %config.update_target(),
        "File store initialized"
    );

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Upload;
    use skinstore_core::UpdateTarget;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_store_applies_config() {
        let dir = tempdir().unwrap();
        let config = Config {
            storage_path: dir.path().join("skins"),
            public_base_url: "https://cdn.example.com".to_string(),
            storage_url_segment: "skins".to_string(),
            allowed_content_types: vec!["image/png".to_string()],
            update_target: UpdateTarget::Resolved,
            ..Config::default()
        };

        let store = create_store(&config).await.unwrap();
        assert!(dir.path().join("skins").is_dir());
        assert_eq!(store.public_url("a.png"), "https://cdn.example.com/skins/a.png");
        assert!(store.validate(Some("image/jpeg")).is_err());

        let upload = Upload::from_bytes("Steve.PNG", Some("image/png"), b"px".to_vec());
        let url = store.save(Some(upload)).await.unwrap();
        assert_eq!(url, "https://cdn.example.com/skins/steve.png");
    }
}
