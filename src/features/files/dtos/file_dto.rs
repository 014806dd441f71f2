use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::files::models::{Favorite, File, FileType};
use crate::shared::validation::ORG_ID_REGEX;

/// Request DTO for registering an uploaded object as a file
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFileDto {
    /// Display name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[schema(example = "Q1.csv")]
    pub name: String,

    #[validate(regex(path = *ORG_ID_REGEX, message = "Invalid org id"))]
    #[schema(example = "org_2abc")]
    pub org_id: String,

    /// Storage id returned with the upload URL
    pub storage_id: Uuid,

    /// File type. Inferred from `mime_type` when omitted.
    #[serde(rename = "type", default)]
    pub file_type: Option<FileType>,

    /// MIME type of the uploaded object
    #[validate(length(max = 255))]
    #[schema(example = "text/csv")]
    pub mime_type: Option<String>,
}

impl CreateFileDto {
    /// Explicit `type` wins over `mime_type`
    pub fn resolve_file_type(&self) -> Result<FileType, AppError> {
        if let Some(file_type) = self.file_type {
            return Ok(file_type);
        }

        match self.mime_type.as_deref() {
            Some(mime_type) => FileType::from_mime_type(mime_type).ok_or_else(|| {
                AppError::Validation(format!("Unsupported file type: {}", mime_type))
            }),
            None => Err(AppError::Validation(
                "Either type or mime_type is required".to_string(),
            )),
        }
    }
}

/// Query parameters for listing files of an org
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
pub struct GetFilesQuery {
    /// Organization or personal workspace id
    pub org_id: String,

    /// Case-insensitive substring of the file name
    #[validate(length(max = 200, message = "Query must not exceed 200 characters"))]
    pub query: Option<String>,

    /// Only files of this type
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,

    /// Only files marked for deletion (default: only files not marked)
    #[serde(default)]
    pub deleted_only: bool,

    /// Only files the caller has favorited
    #[serde(default)]
    pub favorites_only: bool,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct FavoritesQuery {
    pub org_id: String,
}

/// Response DTO for a file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub org_id: String,
    pub storage_id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Null until the file is first deleted or restored
    pub should_delete: Option<bool>,
    /// Whether the caller has favorited the file
    pub is_favorite: bool,
    /// Download URL
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl FileResponseDto {
    pub fn new(file: File, is_favorite: bool, public_url: &str) -> Self {
        Self {
            url: download_url(public_url, file.storage_id),
            id: file.id,
            name: file.name,
            file_type: file.file_type,
            org_id: file.org_id,
            storage_id: file.storage_id,
            user_id: file.user_id,
            should_delete: file.should_delete,
            is_favorite,
            created_at: file.created_at,
        }
    }
}

/// `{public_url}/api/storage/{storage_id}`
pub fn download_url(public_url: &str, storage_id: Uuid) -> String {
    format!(
        "{}/api/storage/{}",
        public_url.trim_end_matches('/'),
        storage_id
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteResponseDto {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub org_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<Favorite> for FavoriteResponseDto {
    fn from(favorite: Favorite) -> Self {
        Self {
            id: favorite.id,
            file_id: favorite.file_id,
            user_id: favorite.user_id,
            org_id: favorite.org_id,
            created_at: favorite.created_at,
        }
    }
}

/// Presigned upload target
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadUrlResponseDto {
    /// PUT the file bytes here before the URL expires
    pub upload_url: String,
    /// Pass this to file creation once the upload finished
    pub storage_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleFavoriteResponseDto {
    pub is_favorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(file_type: Option<FileType>, mime_type: Option<&str>) -> CreateFileDto {
        CreateFileDto {
            name: "Q1.csv".to_string(),
            org_id: "org_123".to_string(),
            storage_id: Uuid::now_v7(),
            file_type,
            mime_type: mime_type.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_file_type() {
        let explicit = create_dto(Some(FileType::Pdf), Some("text/csv"));
        assert_eq!(explicit.resolve_file_type().unwrap(), FileType::Pdf);

        let inferred = create_dto(None, Some("text/csv"));
        assert_eq!(inferred.resolve_file_type().unwrap(), FileType::Csv);

        let unsupported = create_dto(None, Some("application/zip"));
        assert!(matches!(
            unsupported.resolve_file_type(),
            Err(AppError::Validation(_))
        ));

        let missing = create_dto(None, None);
        assert!(matches!(
            missing.resolve_file_type(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_create_file_validation() {
        assert!(create_dto(Some(FileType::Csv), None).validate().is_ok());

        let mut empty_name = create_dto(Some(FileType::Csv), None);
        empty_name.name = String::new();
        assert!(empty_name.validate().is_err());

        let mut long_name = create_dto(Some(FileType::Csv), None);
        long_name.name = "a".repeat(201);
        assert!(long_name.validate().is_err());

        let mut bad_org = create_dto(Some(FileType::Csv), None);
        bad_org.org_id = "org 123".to_string();
        assert!(bad_org.validate().is_err());
    }

    #[test]
    fn test_create_file_dto_accepts_type_field() {
        let dto: CreateFileDto = serde_json::from_str(&format!(
            r#"{{"name":"a.png","org_id":"org_1","storage_id":"{}","type":"image"}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert_eq!(dto.file_type, Some(FileType::Image));
        assert!(dto.mime_type.is_none());
    }

    #[test]
    fn test_query_length_limit() {
        let query = GetFilesQuery {
            org_id: "org_1".to_string(),
            query: Some("x".repeat(201)),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            download_url("https://files.example.com/", Uuid::nil()),
            "https://files.example.com/api/storage/00000000-0000-0000-0000-000000000000"
        );
    }
}
