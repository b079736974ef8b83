//! SkinStore Core Library
//!
//! This crate provides the configuration, error types and response models that are
//! shared by the storage and API crates.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, UpdateTarget};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{FileEntry, MessageResponse, UrlResponse};
