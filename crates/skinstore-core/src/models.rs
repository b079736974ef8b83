//! Response models
//!
//! Every non-binary response is a flat JSON object: a `success` flag plus either a
//! `message` or one custom field such as `url`. Serialization goes through
//! serde_json, which escapes quotes, backslashes and control characters.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{ "success": bool, "message": string }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// `{ "success": true, "url": string }`, returned after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UrlResponse {
    pub success: bool,
    #[schema(example = "http://localhost:8989/files/cat.png")]
    pub url: String,
}

impl UrlResponse {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: url.into(),
        }
    }
}

/// One entry of the file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileEntry {
    #[schema(example = "cat.png")]
    pub filename: String,
    #[schema(example = "http://localhost:8989/files/cat.png")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_response_shape() {
        let value = serde_json::to_value(MessageResponse::ok("File deleted successfully")).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "message": "File deleted successfully" })
        );
    }

    #[test]
    fn url_response_shape() {
        let value = serde_json::to_value(UrlResponse::new("http://h/files/cat.png")).unwrap();
        assert_eq!(value, json!({ "success": true, "url": "http://h/files/cat.png" }));
    }

    #[test]
    fn strings_are_json_escaped() {
        let raw = "quote\" back\\slash\nnew\ttab\u{8}\u{c}\r";
        let body = serde_json::to_string(&MessageResponse::failure(raw)).unwrap();
        assert_eq!(
            body,
            r#"{"success":false,"message":"quote\" back\\slash\nnew\ttab\b\f\r"}"#
        );
        let back: MessageResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(back.message, raw);
    }
}
