use crate::media_type::{infer_media_type, UploadValidator, SNIFF_LEN};
use crate::naming::{canonical_name, is_plain_name};
use crate::traits::{
    FileStore, OpenedFile, StorageError, StorageResult, StoredFile, Upload, UploadBody,
};
use async_trait::async_trait;
use futures::StreamExt;
use skinstore_core::UpdateTarget;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Extensions tried, in order, when an identifier does not match a file verbatim.
pub const DEFAULT_RESOLVE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// Local filesystem file store over a single flat directory.
#[derive(Clone, Debug)]
pub struct LocalFileStore {
    base_path: PathBuf,
    base_url: String,
    validator: UploadValidator,
    resolve_extensions: Vec<String>,
    update_target: UpdateTarget,
}

impl LocalFileStore {
    /// Create a new LocalFileStore, creating the storage directory if needed.
    ///
    /// # Arguments
    /// * `base_path` - Directory holding every stored file (e.g., "files")
    /// * `base_url` - Base URL for public file URLs (e.g., "http://localhost:8989/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        tracing::info!(path = %base_path.display(), "Storage directory ready");

        Ok(LocalFileStore {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            validator: UploadValidator::default(),
            resolve_extensions: DEFAULT_RESOLVE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            update_target: UpdateTarget::default(),
        })
    }

    pub fn with_allowed_content_types<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.validator = UploadValidator::new(allowed);
        self
    }

    pub fn with_resolve_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolve_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_update_target(mut self, update_target: UpdateTarget) -> Self {
        self.update_target = update_target;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn resolve_extensions(&self) -> &[String] {
        &self.resolve_extensions
    }

    /// Candidate names for an identifier: verbatim, then each extension appended.
    fn candidates<'a>(&'a self, identifier: &'a str) -> impl Iterator<Item = String> + 'a {
        std::iter::once(identifier.to_string()).chain(
            self.resolve_extensions
                .iter()
                .map(move |ext| format!("{}{}", identifier, ext)),
        )
    }

    /// Metadata of `name` inside the store if it is a regular file.
    async fn regular_file(&self, name: &str) -> Option<StoredFile> {
        let path = self.base_path.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(StoredFile {
                name: name.to_string(),
                url: self.public_url(name),
                size_bytes: meta.len(),
                path,
            }),
            _ => None,
        }
    }

    /// Stream `body` into `name`, replacing any existing file.
    async fn write(&self, name: &str, mut body: UploadBody<'_>) -> StorageResult<String> {
        let path = self.base_path.join(name);
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        // The reader's error is kept as-is so callers can tell a rejected body from a disk failure.
        let bytes_copied = tokio::io::copy(&mut body, &mut file).await.map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to write stream to file, partial content may remain"
            );
            StorageError::IoError(e)
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.public_url(name);

        tracing::info!(
            path = %path.display(),
            name = %name,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local file store write successful"
        );

        Ok(url)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn validate(&self, content_type: Option<&str>) -> StorageResult<()> {
        self.validator.validate(content_type)
    }

    async fn resolve(&self, identifier: &str) -> StorageResult<StoredFile> {
        if !is_plain_name(identifier) {
            tracing::warn!(
                identifier = %identifier.escape_debug(),
                "Rejected identifier that does not name a file inside the store"
            );
            return Err(StorageError::NotFound(identifier.to_string()));
        }

        for candidate in self.candidates(identifier) {
            if !is_plain_name(&candidate) {
                continue;
            }
            if let Some(found) = self.regular_file(&candidate).await {
                tracing::debug!(identifier = %identifier, name = %found.name, "Resolved identifier");
                return Ok(found);
            }
        }

        Err(StorageError::NotFound(identifier.to_string()))
    }

    async fn save<'a>(&self, upload: Option<Upload<'a>>) -> StorageResult<String> {
        let upload = upload.ok_or(StorageError::MissingUpload)?;
        self.validator.validate(upload.content_type.as_deref())?;
        let name = canonical_name(&upload.filename)?;

        self.write(&name, upload.body).await
    }

    async fn list(&self) -> StorageResult<Vec<StoredFile>> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.base_path.display(),
                    error = %e,
                    "Storage directory not readable, listing as empty"
                );
                return Ok(Vec::new());
            }
        };

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read directory entry, stopping listing");
                    break;
                }
            };

            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };

            if let Some(file) = self.regular_file(&name).await {
                files.push(file);
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn delete(&self, identifier: &str) -> StorageResult<()> {
        let file = self.resolve(identifier).await?;
        let start = std::time::Instant::now();

        fs::remove_file(&file.path).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                file.path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %file.path.display(),
            name = %file.name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local file store delete successful"
        );

        Ok(())
    }

    async fn update<'a>(
        &self,
        identifier: &str,
        upload: Option<Upload<'a>>,
    ) -> StorageResult<String> {
        let target = self.resolve(identifier).await?;
        let upload = upload.ok_or(StorageError::MissingUpload)?;
        self.validator.validate(upload.content_type.as_deref())?;
        let name = canonical_name(&upload.filename)?;

        match self.update_target {
            UpdateTarget::Upload => {
                if name != target.name {
                    tracing::warn!(
                        resolved = %target.name,
                        stored = %name,
                        "Update stored under the upload's name; the resolved file is left unchanged"
                    );
                }
                self.write(&name, upload.body).await
            }
            UpdateTarget::Resolved => self.write(&target.name, upload.body).await,
        }
    }

    async fn open(&self, identifier: &str) -> StorageResult<OpenedFile> {
        let file = self.resolve(identifier).await?;

        let mut handle = fs::File::open(&file.path).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to open file {}: {}",
                file.path.display(),
                e
            ))
        })?;

        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut handle)
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .await?;
        handle.seek(SeekFrom::Start(0)).await?;

        let media_type = infer_media_type(&file.name, &head);

        let name = file.name.clone();
        let stream = tokio_util::io::ReaderStream::new(handle).map(move |result| {
            result.map_err(|e| {
                tracing::error!(name = %name, error = %e, "Local file store stream read error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(OpenedFile {
            file,
            media_type,
            stream: Box::pin(stream),
        })
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let meta = fs::metadata(&self.base_path).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StorageError::ConfigError(format!(
                "{} is not a directory",
                self.base_path.display()
            )))
        }
    }
}
