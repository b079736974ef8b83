//! Media types: upload validation and read-time inference.
//!
//! Uploads are judged by the media type the client declares; the bytes are not
//! inspected, so a PNG declared as `image/jpeg` is accepted as-is. When a file is
//! read back its type is inferred from its leading bytes, then from its extension.

use crate::traits::{StorageError, StorageResult};

/// Media types accepted when nothing else is configured.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Bytes read from the start of a file for type sniffing.
pub const SNIFF_LEN: usize = 64;

/// Normalize MIME type by stripping parameters (e.g. "image/png; charset=binary" -> "image/png").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Checks declared upload media types against an allowlist (case-insensitive).
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed: Vec<String>,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_CONTENT_TYPES.iter().copied())
    }
}

impl UploadValidator {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Accept the declared type only if it is present and on the allowlist.
    pub fn validate(&self, declared: Option<&str>) -> StorageResult<()> {
        let Some(declared) = declared else {
            return Err(StorageError::UnsupportedMediaType(
                "no media type declared".to_string(),
            ));
        };

        let normalized = normalize_mime_type(declared).to_lowercase();
        if self.allowed.iter().any(|allowed| *allowed == normalized) {
            Ok(())
        } else {
            Err(StorageError::UnsupportedMediaType(format!(
                "'{}' is not one of: {}",
                declared,
                self.allowed.join(", ")
            )))
        }
    }
}

/// Infer the media type of a stored file from its first bytes, falling back to its
/// name and finally to `application/octet-stream`.
pub fn infer_media_type(name: &str, head: &[u8]) -> String {
    if let Some(kind) = infer::get(head) {
        return kind.mime_type().to_string();
    }

    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    #[test]
    fn validator_accepts_png_and_jpeg_case_insensitively() {
        let validator = UploadValidator::default();
        assert!(validator.validate(Some("image/png")).is_ok());
        assert!(validator.validate(Some("IMAGE/JPEG")).is_ok());
        assert!(validator.validate(Some("Image/Png; charset=binary")).is_ok());
    }

    #[test]
    fn validator_rejects_absent_and_other_types() {
        let validator = UploadValidator::default();
        for declared in [None, Some(""), Some("text/plain"), Some("image/gif"), Some("image/jpg")] {
            assert!(
                matches!(
                    validator.validate(declared),
                    Err(StorageError::UnsupportedMediaType(_))
                ),
                "expected {:?} to be rejected",
                declared
            );
        }
    }

    #[test]
    fn validator_uses_configured_list() {
        let validator = UploadValidator::new(["image/webp"]);
        assert!(validator.validate(Some("image/webp")).is_ok());
        assert!(validator.validate(Some("image/png")).is_err());
    }

    #[test]
    fn infer_prefers_bytes_over_extension() {
        assert_eq!(infer_media_type("skin.jpg", PNG_MAGIC), "image/png");
        assert_eq!(infer_media_type("skin", JPEG_MAGIC), "image/jpeg");
    }

    #[test]
    fn infer_falls_back_to_extension_then_octet_stream() {
        assert_eq!(infer_media_type("skin.png", b"not an image"), "image/png");
        assert_eq!(infer_media_type("skin.jpeg", b""), "image/jpeg");
        assert_eq!(
            infer_media_type("skin", b"plain bytes"),
            "application/octet-stream"
        );
    }
}
