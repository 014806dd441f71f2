use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::MaybeUser;
use crate::features::users::dtos::{CurrentUserDto, UserProfileDto};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// Get the signed-in caller's user record
///
/// `data` is null for anonymous callers and for identities the identity
/// provider has not provisioned yet.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user, or null", body = ApiResponse<CurrentUserDto>),
        (status = 401, description = "Invalid token")
    ),
    tag = "users",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_current_user(
    identity: MaybeUser,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<CurrentUserDto>>> {
    let user = service.get_current_user(identity.identity()).await?;
    Ok(Json(ApiResponse::success(user, None, None)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/profile",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Display name and image; both null for unknown users", body = ApiResponse<UserProfileDto>)
    ),
    tag = "users"
)]
pub async fn get_user_profile(
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserProfileDto>>> {
    let profile = service.get_user_profile(id).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}
