pub mod file_removal;
pub mod upload;

pub use file_removal::FileRemovalService;
pub use upload::{UploadCoordinator, UploadPart, UploadRequest};
