//! MinIO/S3-compatible storage client
//!
//! Hands out presigned upload and download URLs for objects addressed by
//! storage id. Bytes never pass through this service.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ObjectStore;
use crate::core::config::StorageConfig;
use crate::core::error::AppError;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    /// Bucket handle on the internal endpoint, for server-side calls
    bucket: Box<Bucket>,
    /// Bucket handle on the public endpoint, for URLs handed to browsers
    presign_bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    upload_prefix: String,
    presigned_url_expiry_secs: u32,
    endpoint: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration
    pub fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let public_region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.public_endpoint.clone(),
        };

        // Path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;
        bucket.set_path_style();

        let mut presign_bucket = Bucket::new(&config.bucket, public_region, credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;
        presign_bucket.set_path_style();

        info!(
            "MinIO client initialized for endpoint: {}, public endpoint: {}, bucket: {}",
            config.endpoint, config.public_endpoint, config.bucket
        );

        Ok(Self {
            bucket,
            presign_bucket,
            region,
            credentials,
            upload_prefix: config.upload_prefix,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
            endpoint: config.endpoint,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}' on {}: {}. Assuming it exists.",
                        self.bucket.name(),
                        self.endpoint,
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), AppError> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Internal(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }

    /// Object key for a storage id (e.g., "uploads/0190f0c4-...")
    pub fn object_key(&self, storage_id: Uuid) -> String {
        object_key(&self.upload_prefix, storage_id)
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

fn object_key(prefix: &str, storage_id: Uuid) -> String {
    if prefix.is_empty() {
        storage_id.to_string()
    } else {
        format!("{}/{}", prefix, storage_id)
    }
}

#[async_trait]
impl ObjectStore for MinIOClient {
    async fn presign_upload(&self, storage_id: Uuid) -> Result<String, AppError> {
        let key = self.object_key(storage_id);
        let url = self
            .presign_bucket
            .presign_put(&key, self.presigned_url_expiry_secs, None, None)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to generate presigned upload URL for '{}': {}",
                    key, e
                ))
            })?;

        debug!("Presigned upload URL generated for '{}'", key);
        Ok(url)
    }

    async fn presign_download(&self, storage_id: Uuid) -> Result<String, AppError> {
        let key = self.object_key(storage_id);
        self.presign_bucket
            .presign_get(&key, self.presigned_url_expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })
    }

    async fn exists(&self, storage_id: Uuid) -> Result<bool, AppError> {
        let key = self.object_key(storage_id);
        match self.bucket.head_object(&key).await {
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) if (200..300).contains(&status) => Ok(true),
            Ok((_, status)) => Err(AppError::Internal(format!(
                "Unexpected status {} checking object '{}'",
                status, key
            ))),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Internal(format!(
                        "Failed to check if object '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }
}
