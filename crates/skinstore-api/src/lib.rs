//! SkinStore API Library
//!
//! This crate provides the HTTP handlers, middleware, and application setup.

// Module declarations
mod api_doc;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use state::AppState;
