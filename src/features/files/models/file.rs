use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;

/// Kind of content a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Csv,
    Pdf,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Csv => "csv",
            FileType::Pdf => "pdf",
        }
    }

    /// Infer the file type from an upload's MIME type
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Some(FileType::Pdf),
            "text/csv" => Some(FileType::Csv),
            m if m.starts_with("image/") => Some(FileType::Image),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileType::Image),
            "csv" => Ok(FileType::Csv),
            "pdf" => Ok(FileType::Pdf),
            other => Err(format!("Unknown file type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: Uuid,
    pub name: String,
    pub file_type: FileType,
    pub org_id: String,
    /// Reference to the uploaded object in storage
    pub storage_id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Unset until the file is first deleted or restored
    pub should_delete: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl File {
    pub fn is_marked_for_deletion(&self) -> bool {
        self.should_delete == Some(true)
    }
}

/// Database row for `files`
#[derive(Debug, FromRow)]
pub struct FileRow {
    pub id: Uuid,
    pub name: String,
    pub file_type: String,
    pub org_id: String,
    pub storage_id: Uuid,
    pub user_id: Uuid,
    pub should_delete: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FileRow> for File {
    type Error = AppError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let file_type = row
            .file_type
            .parse::<FileType>()
            .map_err(|e| AppError::Internal(format!("File {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            file_type,
            org_id: row.org_id,
            storage_id: row.storage_id,
            user_id: row.user_id,
            should_delete: row.should_delete,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub file_type: FileType,
    pub org_id: String,
    pub storage_id: Uuid,
    pub user_id: Uuid,
}
