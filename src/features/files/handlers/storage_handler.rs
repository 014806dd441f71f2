use axum::{
    extract::{Path, State},
    response::Redirect,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::services::FileService;

/// Download a stored object
///
/// Redirects to a short-lived presigned URL on the object store.
#[utoipa::path(
    get,
    path = "/api/storage/{storage_id}",
    tag = "storage",
    params(
        ("storage_id" = Uuid, Path, description = "Storage id of the uploaded object")
    ),
    responses(
        (status = 307, description = "Redirect to the object"),
        (status = 404, description = "No such object")
    )
)]
pub async fn download_object(
    State(service): State<Arc<FileService>>,
    Path(storage_id): Path<Uuid>,
) -> Result<Redirect> {
    let url = service.download_url(storage_id).await?;
    Ok(Redirect::temporary(&url))
}
