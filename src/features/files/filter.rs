//! In-memory selection over an org's files.

use std::collections::HashSet;
use uuid::Uuid;

use crate::features::files::dtos::GetFilesQuery;
use crate::features::files::models::{File, FileType};

#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// Lowercased name fragment; empty matches everything
    name_query: Option<String>,
    file_type: Option<FileType>,
    deleted_only: bool,
    favorites_only: bool,
}

impl FileFilter {
    pub fn matches(&self, file: &File, favorite_ids: &HashSet<Uuid>) -> bool {
        if let Some(query) = &self.name_query {
            if !file.name.to_lowercase().contains(query) {
                return false;
            }
        }

        if let Some(file_type) = self.file_type {
            if file.file_type != file_type {
                return false;
            }
        }

        if file.is_marked_for_deletion() != self.deleted_only {
            return false;
        }

        !self.favorites_only || favorite_ids.contains(&file.id)
    }

    pub fn apply(&self, files: Vec<File>, favorite_ids: &HashSet<Uuid>) -> Vec<File> {
        files
            .into_iter()
            .filter(|file| self.matches(file, favorite_ids))
            .collect()
    }
}

impl From<&GetFilesQuery> for FileFilter {
    fn from(query: &GetFilesQuery) -> Self {
        Self {
            name_query: query
                .query
                .as_deref()
                .filter(|q| !q.is_empty())
                .map(str::to_lowercase),
            file_type: query.file_type,
            deleted_only: query.deleted_only,
            favorites_only: query.favorites_only,
        }
    }
}
