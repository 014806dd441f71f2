//! Storage module for file management
//!
//! Objects are uploaded and downloaded by clients directly through presigned
//! URLs; this service only issues the URLs and checks that objects exist.

mod minio_client;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// Object store addressed by storage id
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Time-limited URL the client PUTs the bytes to
    async fn presign_upload(&self, storage_id: Uuid) -> Result<String, AppError>;

    /// Time-limited URL to read the object
    async fn presign_download(&self, storage_id: Uuid) -> Result<String, AppError>;

    async fn exists(&self, storage_id: Uuid) -> Result<bool, AppError>;
}
