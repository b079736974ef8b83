//! File CRUD handlers
//!
//! Uploads arrive as multipart forms with one file part named `file`. A request that
//! is not multipart at all is treated the same as one without a file part.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use futures::StreamExt;
use skinstore_core::{AppError, FileEntry, MessageResponse, UrlResponse};
use skinstore_storage::OpenedFile;
use utoipa::ToSchema;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{field_upload, is_upload_field, multipart_error};

/// Multipart body accepted by create and update.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct FileUpload {
    /// Image file; its declared content type must be PNG or JPEG.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Build `inline; filename="..."`, escaping quotes and backslashes.
fn content_disposition(name: &str) -> Option<HeaderValue> {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_bytes(format!("inline; filename=\"{}\"", escaped).as_bytes()).ok()
}

/// Upload a file
///
/// Stores the file under its lowercased name and returns its public URL. An
/// existing file with the same name is replaced.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UrlResponse),
        (status = 400, description = "No file part, or an unusable filename", body = MessageResponse),
        (status = 413, description = "File too large", body = MessageResponse),
        (status = 415, description = "Declared type is not an accepted image type", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UrlResponse>, HttpAppError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(rejection = %rejection, "Request is not a multipart upload");
            let url = state.store.save(None).await?;
            return Ok(Json(UrlResponse::new(url)));
        }
    };

    let url = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if is_upload_field(&field) => {
                break state.store.save(Some(field_upload(field))).await?;
            }
            Some(_) => continue,
            None => break state.store.save(None).await?,
        }
    };

    tracing::info!(url = %url, "File uploaded");
    Ok(Json(UrlResponse::new(url)))
}

/// List stored files
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All stored files in name order", body = Vec<FileEntry>),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileEntry>>, HttpAppError> {
    let files = state.store.list().await?;
    tracing::debug!(count = files.len(), "Listed files");

    Ok(Json(
        files
            .into_iter()
            .map(|file| FileEntry {
                filename: file.name,
                url: file.url,
            })
            .collect(),
    ))
}

/// Download a file
///
/// The identifier may omit the extension: `cat` finds `cat.png`.
#[utoipa::path(
    get,
    path = "/files/{identifier}",
    tag = "files",
    params(
        ("identifier" = String, Path, description = "Stored name, with or without extension")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_file"))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> Result<Response, HttpAppError> {
    let OpenedFile {
        file,
        media_type,
        stream,
    } = state.store.open(&identifier).await?;

    tracing::debug!(
        name = %file.name,
        media_type = %media_type,
        size_bytes = file.size_bytes,
        "Streaming file"
    );

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media_type);
    if let Some(disposition) = content_disposition(&file.name) {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    let response = builder
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Replace a file
///
/// The identifier must resolve to an existing file. Where the new content is
/// written depends on the configured update target.
#[utoipa::path(
    put,
    path = "/files/{identifier}",
    tag = "files",
    params(
        ("identifier" = String, Path, description = "Stored name, with or without extension")
    ),
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File replaced", body = UrlResponse),
        (status = 400, description = "No file part, or an unusable filename", body = MessageResponse),
        (status = 404, description = "File not found", body = MessageResponse),
        (status = 413, description = "File too large", body = MessageResponse),
        (status = 415, description = "Declared type is not an accepted image type", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "update_file"))]
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UrlResponse>, HttpAppError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(rejection = %rejection, "Request is not a multipart upload");
            let url = state.store.update(&identifier, None).await?;
            return Ok(Json(UrlResponse::new(url)));
        }
    };

    let url = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if is_upload_field(&field) => {
                break state
                    .store
                    .update(&identifier, Some(field_upload(field)))
                    .await?;
            }
            Some(_) => continue,
            None => break state.store.update(&identifier, None).await?,
        }
    };

    tracing::info!(url = %url, "File updated");
    Ok(Json(UrlResponse::new(url)))
}

/// Delete a file
#[utoipa::path(
    delete,
    path = "/files/{identifier}",
    tag = "files",
    params(
        ("identifier" = String, Path, description = "Stored name, with or without extension")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found", body = MessageResponse),
        (status = 500, description = "Failed to delete file", body = MessageResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_file"))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    state.store.delete(&identifier).await?;
    tracing::info!("File deleted");
    Ok(Json(MessageResponse::ok("File deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_quotes_name() {
        let value = content_disposition("cat.png").unwrap();
        assert_eq!(value, "inline; filename=\"cat.png\"");
    }

    #[test]
    fn test_content_disposition_escapes() {
        let value = content_disposition("a\"b\\c.png").unwrap();
        assert_eq!(value, "inline; filename=\"a\\\"b\\\\c.png\"");
    }

    #[test]
    fn test_content_disposition_keeps_utf8_names() {
        let value = content_disposition("häschen.png").unwrap();
        assert_eq!(value.as_bytes(), "inline; filename=\"häschen.png\"".as_bytes());
    }
}
