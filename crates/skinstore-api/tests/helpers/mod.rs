//! Test helpers: build AppState and router over a temporary storage directory.
//!
//! Run from workspace root: `cargo test -p skinstore-api --test files_test`.

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use skinstore_api::setup::{routes, storage};
use skinstore_api::state::AppState;
use skinstore_core::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server plus the temporary directory backing its store.
pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_path(&self) -> &Path {
        self.config.storage_path()
    }

    pub fn stored(&self, name: &str) -> PathBuf {
        self.storage_path().join(name)
    }
}

/// Setup test app with default settings and an isolated storage directory.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = Config {
        storage_path: temp_dir.path().join("files"),
        ..Config::default()
    };
    configure(&mut config);
    config.validate().expect("Invalid test configuration");

    let store = storage::setup_storage(&config)
        .await
        .expect("Failed to create file store");
    let state = Arc::new(AppState::new(config.clone(), store));
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        config,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with a single `file` part.
pub fn file_form(filename: &str, mime_type: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(data).file_name(filename).mime_type(mime_type);
    MultipartForm::new().add_part("file", part)
}
