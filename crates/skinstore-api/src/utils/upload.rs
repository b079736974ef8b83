//! Multipart plumbing shared by the upload handlers
//!
//! File parts are never buffered: the field is handed to the store as an async reader
//! and copied to disk as it arrives.

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use futures::TryStreamExt;
use skinstore_core::AppError;
use skinstore_storage::Upload;
use std::io;
use tokio_util::io::StreamReader;

/// Form field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Marker carried inside an `io::Error` when the request body hit the size limit
/// while a file part was being streamed.
#[derive(Debug, thiserror::Error)]
#[error("request body exceeds the upload size limit")]
pub struct BodyLimitExceeded;

/// Map a failure to read the next multipart field.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// A file part under the upload field name. Plain form values named `file` do not count.
pub fn is_upload_field(field: &Field<'_>) -> bool {
    field.name() == Some(UPLOAD_FIELD) && field.file_name().is_some()
}

/// Wrap a multipart file part as a streaming [`Upload`].
pub fn field_upload(field: Field<'_>) -> Upload<'_> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let body = StreamReader::new(field.map_err(body_error));
    Upload::new(filename, content_type, body)
}

fn body_error(err: MultipartError) -> io::Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::Error::other(BodyLimitExceeded)
    } else {
        io::Error::other(err)
    }
}

/// Whether a write failed because the body exceeded the size limit.
pub fn is_body_limit_error(err: &io::Error) -> bool {
    err.get_ref()
        .is_some_and(|inner| inner.is::<BodyLimitExceeded>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_error_is_detected() {
        assert!(is_body_limit_error(&io::Error::other(BodyLimitExceeded)));
        assert!(!is_body_limit_error(&io::Error::other("disk full")));
        assert!(!is_body_limit_error(&io::Error::from(
            io::ErrorKind::BrokenPipe
        )));
    }
}
