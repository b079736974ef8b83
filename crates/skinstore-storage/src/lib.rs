//! SkinStore Storage Library
//!
//! This crate provides the file store: a flat directory of image files addressed by
//! name. It validates declared upload types, derives canonical names, resolves
//! identifiers that may omit their extension, and lists, streams and deletes files.
//!
//! # Naming
//!
//! A stored name is the lowercased final path component of the uploaded filename.
//! Names never contain separators, `.`/`..` or control characters, so every stored
//! file lives directly inside the storage directory. Name handling is centralized in
//! the `naming` module.

pub mod factory;
pub mod local;
pub mod media_type;
pub mod naming;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
pub use local::LocalFileStore;
pub use media_type::UploadValidator;
pub use traits::{FileStore, OpenedFile, StorageError, StorageResult, StoredFile, Upload};
