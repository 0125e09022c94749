pub mod album;
pub mod file;
pub mod health;
pub mod upload;
