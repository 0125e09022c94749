//! Multi-file upload with compensating rollback

mod batch;
mod service;
mod types;

pub use batch::{PendingBatch, WriteTask};
pub use service::UploadCoordinator;
pub use types::{FileState, PartBody, UploadPart, UploadRequest};
