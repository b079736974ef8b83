//! File store abstraction
//!
//! This module defines the [`FileStore`] trait the HTTP layer talks to, together with
//! the upload, stored-file and error types that cross that boundary.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// File store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No upload payload present")]
    MissingUpload,

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for file store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Upload payload as an async reader. It may borrow from the request it is read from.
pub type UploadBody<'a> = Pin<Box<dyn AsyncRead + Send + 'a>>;

/// Chunked file content for downloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// One uploaded file: the client-declared filename and media type plus its content.
pub struct Upload<'a> {
    pub filename: String,
    pub content_type: Option<String>,
    pub body: UploadBody<'a>,
}

impl<'a> Upload<'a> {
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        body: impl AsyncRead + Send + 'a,
    ) -> Self {
        Upload {
            filename: filename.into(),
            content_type,
            body: Box::pin(body),
        }
    }
}

impl Upload<'static> {
    /// Upload backed by an in-memory buffer.
    pub fn from_bytes(
        filename: impl Into<String>,
        content_type: Option<&str>,
        data: impl Into<Bytes>,
    ) -> Self {
        Upload::new(
            filename,
            content_type.map(String::from),
            std::io::Cursor::new(data.into()),
        )
    }
}

impl fmt::Debug for Upload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A file that exists in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// On-disk name, including extension.
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Public URL derived from the store's base URL and `name`.
    pub url: String,
}

/// A resolved file opened for reading.
pub struct OpenedFile {
    pub file: StoredFile,
    /// Media type inferred from the leading bytes, then from the extension.
    pub media_type: String,
    pub stream: ByteStream,
}

/// File store trait
///
/// Every operation re-reads the filesystem; implementations keep no per-file state
/// between calls. Concurrent writes to the same canonical name are not serialized:
/// the last write wins.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Check a client-declared media type against the accepted list.
    fn validate(&self, content_type: Option<&str>) -> StorageResult<()>;

    /// Map an identifier, with or without extension, to an existing stored file.
    ///
    /// The identifier is tried verbatim first, then with each configured extension
    /// appended in order. The first regular file found wins.
    async fn resolve(&self, identifier: &str) -> StorageResult<StoredFile>;

    /// Store an upload under its canonical name and return its public URL.
    ///
    /// `None` means the request carried no file at all and yields `MissingUpload`
    /// before any validation. An existing file with the same canonical name is
    /// overwritten.
    async fn save<'a>(&self, upload: Option<Upload<'a>>) -> StorageResult<String>;

    /// All regular files directly inside the store, in lexical order by name.
    ///
    /// A missing or unreadable directory lists as empty.
    async fn list(&self) -> StorageResult<Vec<StoredFile>>;

    /// Remove the file `identifier` resolves to.
    async fn delete(&self, identifier: &str) -> StorageResult<()>;

    /// Replace an existing file. Fails with `NotFound` when `identifier` does not
    /// resolve; where the new content lands depends on the store's update target.
    async fn update<'a>(
        &self,
        identifier: &str,
        upload: Option<Upload<'a>>,
    ) -> StorageResult<String>;

    /// Open the file `identifier` resolves to for streaming.
    async fn open(&self, identifier: &str) -> StorageResult<OpenedFile>;

    /// Public URL for a stored name.
    fn public_url(&self, name: &str) -> String;

    /// Check that the storage directory is reachable.
    async fn health_check(&self) -> StorageResult<()>;
}
