use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, MaybeUser};
use crate::features::files::dtos::{
    CreateFileDto, FavoriteResponseDto, FavoritesQuery, FileResponseDto, GetFilesQuery,
    ToggleFavoriteResponseDto, UploadUrlResponseDto,
};
use crate::features::files::services::FileService;
use crate::shared::types::{ApiResponse, Meta};

/// Get a presigned upload URL
///
/// Upload flow: request an upload URL, PUT the bytes to it, then create the
/// file with the returned `storage_id`.
#[utoipa::path(
    post,
    path = "/api/files/upload-url",
    tag = "files",
    responses(
        (status = 200, description = "Upload URL issued", body = ApiResponse<UploadUrlResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn generate_upload_url(
    identity: MaybeUser,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<UploadUrlResponseDto>>> {
    let upload = service.generate_upload_url(identity.identity()).await?;
    Ok(Json(ApiResponse::success(Some(upload), None, None)))
}

/// Create a file from an uploaded object
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    request_body = CreateFileDto,
    responses(
        (status = 201, description = "File created", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Validation error or missing upload"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "No access to the org")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_file(
    identity: MaybeUser,
    State(service): State<Arc<FileService>>,
    AppJson(dto): AppJson<CreateFileDto>,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let file = service.create_file(identity.identity(), dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(file),
            Some("File created successfully".to_string()),
            None,
        )),
    ))
}

/// List files of an org
///
/// Callers without access to the org get an empty list.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(GetFilesQuery),
    responses(
        (status = 200, description = "Matching files", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Invalid token")
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_files(
    identity: MaybeUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<GetFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let files = service.get_files(identity.identity(), &query).await?;
    let meta = Meta {
        total: files.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(files), None, Some(meta))))
}

/// Mark a file for deletion
#[utoipa::path(
    post,
    path = "/api/files/{id}/delete",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File marked for deletion", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "No access to the file, or not owner or org admin")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    identity: MaybeUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.delete_file(identity.identity(), id).await?;
    Ok(Json(ApiResponse::success(
        Some(file),
        Some("File marked for deletion".to_string()),
        None,
    )))
}

/// Restore a file marked for deletion
#[utoipa::path(
    post,
    path = "/api/files/{id}/restore",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File restored", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "No access to the file, or not owner or org admin")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn restore_file(
    identity: MaybeUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.restore_file(identity.identity(), id).await?;
    Ok(Json(ApiResponse::success(
        Some(file),
        Some("File restored".to_string()),
        None,
    )))
}

/// Toggle the caller's favorite on a file
#[utoipa::path(
    post,
    path = "/api/files/{id}/favorite",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "Resulting favorite state", body = ApiResponse<ToggleFavoriteResponseDto>),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "No access to the file")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn toggle_favorite(
    identity: MaybeUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ToggleFavoriteResponseDto>>> {
    let state = service.toggle_favorite(identity.identity(), id).await?;
    Ok(Json(ApiResponse::success(Some(state), None, None)))
}

/// List the caller's favorites in an org
#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "files",
    params(FavoritesQuery),
    responses(
        (status = 200, description = "Favorites, empty without org access", body = ApiResponse<Vec<FavoriteResponseDto>>),
        (status = 401, description = "Invalid token")
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_all_favorites(
    identity: MaybeUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<ApiResponse<Vec<FavoriteResponseDto>>>> {
    let favorites = service
        .get_all_favorites(identity.identity(), &query.org_id)
        .await?;
    let meta = Meta {
        total: favorites.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(favorites), None, Some(meta))))
}
