use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::{can_delete_file, AccessService, AuthenticatedUser, FileAccess};
use crate::features::changes::{ChangeEvent, ChangeFeed};
use crate::features::files::dtos::{
    CreateFileDto, FavoriteResponseDto, FileResponseDto, GetFilesQuery,
    ToggleFavoriteResponseDto, UploadUrlResponseDto,
};
use crate::features::files::filter::FileFilter;
use crate::features::files::models::{NewFavorite, NewFile};
use crate::features::files::repositories::{FavoriteRepository, FileRepository};
use crate::modules::storage::ObjectStore;

/// Service for file operations
pub struct FileService {
    access: Arc<AccessService>,
    files: Arc<dyn FileRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    storage: Arc<dyn ObjectStore>,
    changes: Arc<ChangeFeed>,
    /// Base for download URLs handed to clients
    public_url: String,
}

impl FileService {
    pub fn new(
        access: Arc<AccessService>,
        files: Arc<dyn FileRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        storage: Arc<dyn ObjectStore>,
        changes: Arc<ChangeFeed>,
        public_url: String,
    ) -> Self {
        Self {
            access,
            files,
            favorites,
            storage,
            changes,
            public_url,
        }
    }

    /// Issue a presigned upload URL under a fresh storage id
    pub async fn generate_upload_url(
        &self,
        identity: Option<&AuthenticatedUser>,
    ) -> Result<UploadUrlResponseDto> {
        let identity = identity.ok_or_else(|| {
            AppError::Unauthorized("You must be logged in to upload a file".to_string())
        })?;

        let storage_id = Uuid::now_v7();
        let upload_url = self.storage.presign_upload(storage_id).await?;

        debug!(
            "Issued upload URL for storage id {} to {}",
            storage_id, identity.token_identifier
        );

        Ok(UploadUrlResponseDto {
            upload_url,
            storage_id,
        })
    }

    /// Register an uploaded object as a file owned by the caller
    pub async fn create_file(
        &self,
        identity: Option<&AuthenticatedUser>,
        dto: CreateFileDto,
    ) -> Result<FileResponseDto> {
        let file_type = dto.resolve_file_type()?;

        let user = self
            .access
            .has_access_to_org(identity, &dto.org_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("You do not have access to this org".to_string()))?;

        if !self.storage.exists(dto.storage_id).await? {
            return Err(AppError::BadRequest(format!(
                "No uploaded object for storage id {}",
                dto.storage_id
            )));
        }

        let file = self
            .files
            .insert(NewFile {
                name: dto.name,
                file_type,
                org_id: dto.org_id,
                storage_id: dto.storage_id,
                user_id: user.id,
            })
            .await?;

        info!(
            "File {} ({}) created in org {} by user {}",
            file.id, file.file_type, file.org_id, user.id
        );
        self.publish_files_changed(&file.org_id);

        Ok(FileResponseDto::new(file, false, &self.public_url))
    }

    /// Files of an org matching the query. Callers without access get an
    /// empty list.
    pub async fn get_files(
        &self,
        identity: Option<&AuthenticatedUser>,
        query: &GetFilesQuery,
    ) -> Result<Vec<FileResponseDto>> {
        let Some(user) = self.access.has_access_to_org(identity, &query.org_id).await? else {
            return Ok(Vec::new());
        };

        let files = self.files.list_by_org(&query.org_id).await?;
        let favorite_ids: HashSet<Uuid> = self
            .favorites
            .list_for_user(user.id, &query.org_id)
            .await?
            .into_iter()
            .map(|favorite| favorite.file_id)
            .collect();

        let files = FileFilter::from(query)
            .apply(files, &favorite_ids)
            .into_iter()
            .map(|file| {
                let is_favorite = favorite_ids.contains(&file.id);
                FileResponseDto::new(file, is_favorite, &self.public_url)
            })
            .collect();

        Ok(files)
    }

    /// Mark a file for deletion
    pub async fn delete_file(
        &self,
        identity: Option<&AuthenticatedUser>,
        file_id: Uuid,
    ) -> Result<FileResponseDto> {
        self.set_should_delete(identity, file_id, true).await
    }

    /// Clear the deletion mark
    pub async fn restore_file(
        &self,
        identity: Option<&AuthenticatedUser>,
        file_id: Uuid,
    ) -> Result<FileResponseDto> {
        self.set_should_delete(identity, file_id, false).await
    }

    async fn set_should_delete(
        &self,
        identity: Option<&AuthenticatedUser>,
        file_id: Uuid,
        should_delete: bool,
    ) -> Result<FileResponseDto> {
        let FileAccess { user, file } = self.require_file_access(identity, file_id).await?;

        if !can_delete_file(&user, &file) {
            return Err(AppError::Forbidden(
                "You have no access to delete this file".to_string(),
            ));
        }

        let file = self.files.set_should_delete(file.id, should_delete).await?;
        let is_favorite = self
            .favorites
            .find(user.id, &file.org_id, file.id)
            .await?
            .is_some();

        info!(
            "File {} should_delete set to {} by user {}",
            file.id, should_delete, user.id
        );
        self.publish_files_changed(&file.org_id);

        Ok(FileResponseDto::new(file, is_favorite, &self.public_url))
    }

    /// Favorite the file, or remove the favorite when it already exists
    pub async fn toggle_favorite(
        &self,
        identity: Option<&AuthenticatedUser>,
        file_id: Uuid,
    ) -> Result<ToggleFavoriteResponseDto> {
        let FileAccess { user, file } = self.require_file_access(identity, file_id).await?;

        let is_favorite = self
            .favorites
            .toggle(NewFavorite {
                file_id: file.id,
                user_id: user.id,
                org_id: file.org_id.clone(),
            })
            .await?;

        debug!(
            "File {} favorite for user {} is now {}",
            file.id, user.id, is_favorite
        );
        self.changes.publish(ChangeEvent::FavoritesChanged {
            org_id: file.org_id,
            user_id: user.id,
        });

        Ok(ToggleFavoriteResponseDto { is_favorite })
    }

    /// The caller's favorites in an org. Callers without access get an empty
    /// list.
    pub async fn get_all_favorites(
        &self,
        identity: Option<&AuthenticatedUser>,
        org_id: &str,
    ) -> Result<Vec<FavoriteResponseDto>> {
        let Some(user) = self.access.has_access_to_org(identity, org_id).await? else {
            return Ok(Vec::new());
        };

        let favorites = self.favorites.list_for_user(user.id, org_id).await?;
        Ok(favorites.into_iter().map(Into::into).collect())
    }

    /// Presigned download URL for a stored object
    pub async fn download_url(&self, storage_id: Uuid) -> Result<String> {
        if !self.storage.exists(storage_id).await? {
            return Err(AppError::NotFound(format!(
                "No stored object {}",
                storage_id
            )));
        }

        self.storage.presign_download(storage_id).await
    }

    async fn require_file_access(
        &self,
        identity: Option<&AuthenticatedUser>,
        file_id: Uuid,
    ) -> Result<FileAccess> {
        self.access
            .has_access_to_file(identity, file_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("No access to file".to_string()))
    }

    fn publish_files_changed(&self, org_id: &str) {
        self.changes.publish(ChangeEvent::FilesChanged {
            org_id: org_id.to_string(),
        });
    }
}
