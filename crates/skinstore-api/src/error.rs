//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Store errors convert through
//! `From<StorageError>`, so `?` is enough to get a consistent status, envelope and log line.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use skinstore_core::{AppError, ErrorMetadata, LogLevel, MessageResponse};
use skinstore_storage::StorageError;

use crate::utils::upload::is_body_limit_error;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from skinstore-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                details = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Clients only ever see the fixed message; details stay in the logs.
        let body = Json(MessageResponse::failure(app_error.client_message()));

        (status, body).into_response()
    }
}

// Convert store errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::MissingUpload => AppError::MissingUpload,
            StorageError::UnsupportedMediaType(msg) => AppError::UnsupportedMediaType(msg),
            StorageError::InvalidFilename(msg) => AppError::InvalidFilename(msg),
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::UploadFailed(msg) => AppError::Internal(msg),
            StorageError::DownloadFailed(msg) => AppError::Internal(msg),
            StorageError::DeleteFailed(msg) => AppError::DeleteFailed(msg),
            StorageError::IoError(err) if is_body_limit_error(&err) => {
                AppError::PayloadTooLarge(err.to_string())
            }
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}
