//! Configuration module
//!
//! Settings are read from the process environment (and a `.env` file when present)
//! by [`Config::from_env`]. Every field has a default so the service starts with no
//! configuration at all; [`Config::validate`] rejects combinations that cannot work.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

// Common constants
const SERVER_PORT: u16 = 8989;
const PUBLIC_BASE_URL: &str = "http://localhost:8989";
const STORAGE_PATH: &str = "files";
const STORAGE_URL_SEGMENT: &str = "files";
const ALLOWED_CONTENT_TYPES: &str = "image/png,image/jpeg";
const RESOLVE_EXTENSIONS: &str = ".png,.jpg,.jpeg";
const MAX_FILE_SIZE_MB: usize = 10;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Which file an update writes to once the target identifier has been resolved.
///
/// `Upload` stores the new content under the new upload's own canonical name, so an
/// update of `cat` with an upload named `dog.png` writes `dog.png` and leaves the
/// resolved `cat.png` untouched. `Resolved` always overwrites the resolved file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateTarget {
    #[default]
    Upload,
    Resolved,
}

impl FromStr for UpdateTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upload" => Ok(UpdateTarget::Upload),
            "resolved" => Ok(UpdateTarget::Resolved),
            _ => Err(anyhow::anyhow!("Invalid update target: {}", s)),
        }
    }
}

impl Display for UpdateTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UpdateTarget::Upload => write!(f, "upload"),
            UpdateTarget::Resolved => write!(f, "resolved"),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Emit logs as JSON lines instead of the compact console format.
    pub log_json: bool,
    /// Explicit CORS origins. `None` mirrors the request origin.
    pub cors_origins: Option<Vec<String>>,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    // Storage configuration
    pub storage_path: PathBuf,
    pub public_base_url: String,
    pub storage_url_segment: String,
    // Upload handling
    pub allowed_content_types: Vec<String>,
    pub resolve_extensions: Vec<String>,
    pub update_target: UpdateTarget,
    pub max_file_size_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            log_json: false,
            cors_origins: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            storage_path: PathBuf::from(STORAGE_PATH),
            public_base_url: PUBLIC_BASE_URL.to_string(),
            storage_url_segment: STORAGE_URL_SEGMENT.to_string(),
            allowed_content_types: parse_list(ALLOWED_CONTENT_TYPES),
            resolve_extensions: parse_list(RESOLVE_EXTENSIONS),
            update_target: UpdateTarget::default(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
        }
    }
}

/// Split a comma-separated setting into trimmed, lowercased, non-empty entries.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            log_json: env::var("LOG_FORMAT")
                .map(|s| s.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            cors_origins,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS)
                .max(1),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            storage_path: PathBuf::from(
                env::var("STORAGE_PATH").unwrap_or_else(|_| STORAGE_PATH.to_string()),
            ),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| PUBLIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            storage_url_segment: env::var("STORAGE_URL_SEGMENT")
                .unwrap_or_else(|_| STORAGE_URL_SEGMENT.to_string())
                .trim_matches('/')
                .to_string(),
            allowed_content_types: parse_list(
                &env::var("ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| ALLOWED_CONTENT_TYPES.to_string()),
            ),
            resolve_extensions: parse_list(
                &env::var("RESOLVE_EXTENSIONS").unwrap_or_else(|_| RESOLVE_EXTENSIONS.to_string()),
            ),
            update_target: match env::var("UPDATE_TARGET") {
                Ok(value) => value.parse()?,
                Err(_) => UpdateTarget::default(),
            },
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must start with http:// or https://"
            ));
        }

        if self.storage_url_segment.is_empty() || self.storage_url_segment.contains('/') {
            return Err(anyhow::anyhow!(
                "STORAGE_URL_SEGMENT must be a single non-empty path segment"
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one media type"
            ));
        }

        if let Some(ext) = self
            .resolve_extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2 || ext.contains('/'))
        {
            return Err(anyhow::anyhow!(
                "RESOLVE_EXTENSIONS entries must look like '.png', got '{}'",
                ext
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn log_json(&self) -> bool {
        self.log_json
    }

    pub fn cors_origins(&self) -> Option<&[String]> {
        self.cors_origins.as_deref()
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.http_concurrency_limit
    }

    pub fn storage_path(&self) -> &std::path::Path {
        &self.storage_path
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn storage_url_segment(&self) -> &str {
        &self.storage_url_segment
    }

    /// Base for public file URLs: `{PUBLIC_BASE_URL}/{STORAGE_URL_SEGMENT}`.
    pub fn files_base_url(&self) -> String {
        format!("{}/{}", self.public_base_url, self.storage_url_segment)
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    pub fn resolve_extensions(&self) -> &[String] {
        &self.resolve_extensions
    }

    pub fn update_target(&self) -> UpdateTarget {
        self.update_target
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_bytes
    }
}
