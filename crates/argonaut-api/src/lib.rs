//! Argonaut API Library
//!
//! This crate provides the upload coordinator, the HTTP handlers and the
//! application setup.

pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;
mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::{FileRemovalService, UploadCoordinator, UploadPart, UploadRequest};
pub use state::AppState;
