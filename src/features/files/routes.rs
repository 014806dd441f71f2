use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers;
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/files/upload-url", post(handlers::generate_upload_url))
        .route(
            "/api/files",
            get(handlers::get_files).post(handlers::create_file),
        )
        .route("/api/files/{id}/delete", post(handlers::delete_file))
        .route("/api/files/{id}/restore", post(handlers::restore_file))
        .route("/api/files/{id}/favorite", post(handlers::toggle_favorite))
        .route("/api/favorites", get(handlers::get_all_favorites))
        .route("/api/storage/{storage_id}", get(handlers::download_object))
        .with_state(file_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::dtos::{
        FavoriteResponseDto, FileResponseDto, ToggleFavoriteResponseDto, UploadUrlResponseDto,
    };
    use crate::features::files::models::FileType;
    use crate::features::users::models::OrgRole;
    use crate::shared::test_helpers::{identity_for, with_identity, TestContext};
    use crate::shared::types::ApiResponse;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn server_for(ctx: &TestContext, sub: &str) -> TestServer {
        TestServer::new(with_identity(routes(ctx.files.clone()), identity_for(sub))).unwrap()
    }

    fn anonymous_server(ctx: &TestContext) -> TestServer {
        TestServer::new(routes(ctx.files.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_upload_create_list_delete_flow() {
        let ctx = TestContext::new();
        ctx.users
            .seed("user_1", &[("org_123", OrgRole::Member)])
            .await;
        let server = server_for(&ctx, "user_1");

        let upload = server.post("/api/files/upload-url").await;
        upload.assert_status_ok();
        let upload = upload
            .json::<ApiResponse<UploadUrlResponseDto>>()
            .data
            .unwrap();
        ctx.storage.mark_uploaded(upload.storage_id).await;

        let created = server
            .post("/api/files")
            .json(&json!({
                "name": "Q1.csv",
                "org_id": "org_123",
                "storage_id": upload.storage_id,
                "mime_type": "text/csv"
            }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let file = created.json::<ApiResponse<FileResponseDto>>().data.unwrap();
        assert_eq!(file.name, "Q1.csv");
        assert_eq!(file.file_type, FileType::Csv);
        assert_eq!(file.should_delete, None);

        let listed = server
            .get("/api/files")
            .add_query_param("org_id", "org_123")
            .await;
        listed.assert_status_ok();
        let listed = listed.json::<ApiResponse<Vec<FileResponseDto>>>();
        assert_eq!(listed.meta.unwrap().total, 1);

        server
            .post(&format!("/api/files/{}/delete", file.id))
            .await
            .assert_status_ok();

        let live = server
            .get("/api/files")
            .add_query_param("org_id", "org_123")
            .await
            .json::<ApiResponse<Vec<FileResponseDto>>>();
        assert!(live.data.unwrap().is_empty());

        let trash = server
            .get("/api/files")
            .add_query_param("org_id", "org_123")
            .add_query_param("deleted_only", true)
            .await
            .json::<ApiResponse<Vec<FileResponseDto>>>();
        assert_eq!(trash.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_favorite_routes() {
        let ctx = TestContext::new();
        let user = ctx.users.seed("user_1", &[("org_1", OrgRole::Member)]).await;
        let file = ctx.seed_file(user.id, "org_1", "chart.png", FileType::Image).await;
        let server = server_for(&ctx, "user_1");

        let toggled = server
            .post(&format!("/api/files/{}/favorite", file.id))
            .await
            .json::<ApiResponse<ToggleFavoriteResponseDto>>();
        assert!(toggled.data.unwrap().is_favorite);

        let favorites = server
            .get("/api/favorites")
            .add_query_param("org_id", "org_1")
            .await
            .json::<ApiResponse<Vec<FavoriteResponseDto>>>();
        assert_eq!(favorites.data.unwrap()[0].file_id, file.id);
    }

    #[tokio::test]
    async fn test_anonymous_callers() {
        let ctx = TestContext::new();
        let user = ctx.users.seed("user_1", &[("org_1", OrgRole::Member)]).await;
        let file = ctx.seed_file(user.id, "org_1", "a.pdf", FileType::Pdf).await;
        let server = anonymous_server(&ctx);

        let listed = server.get("/api/files").add_query_param("org_id", "org_1").await;
        listed.assert_status_ok();
        assert!(listed
            .json::<ApiResponse<Vec<FileResponseDto>>>()
            .data
            .unwrap()
            .is_empty());

        server
            .post("/api/files/upload-url")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post(&format!("/api/files/{}/favorite", file.id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_member_cannot_delete_others_file() {
        let ctx = TestContext::new();
        let owner = ctx.users.seed("user_owner", &[("org_1", OrgRole::Member)]).await;
        ctx.users.seed("user_member", &[("org_1", OrgRole::Member)]).await;
        let file = ctx.seed_file(owner.id, "org_1", "a.pdf", FileType::Pdf).await;

        server_for(&ctx, "user_member")
            .post(&format!("/api/files/{}/delete", file.id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_file_rejects_invalid_input() {
        let ctx = TestContext::new();
        ctx.users.seed("user_1", &[("org_1", OrgRole::Member)]).await;
        let server = server_for(&ctx, "user_1");

        server
            .post("/api/files")
            .json(&json!({
                "name": "",
                "org_id": "org_1",
                "storage_id": uuid::Uuid::now_v7(),
                "type": "pdf"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/files")
            .json(&json!({ "name": "a.pdf" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_redirects_to_presigned_url() {
        let ctx = TestContext::new();
        let storage_id = ctx.storage.put_object().await;
        let server = anonymous_server(&ctx);

        let response = server.get(&format!("/api/storage/{}", storage_id)).await;
        response.assert_status(StatusCode::TEMPORARY_REDIRECT);
        let location = response.header("location");
        assert!(location
            .to_str()
            .unwrap()
            .contains(&storage_id.to_string()));

        server
            .get(&format!("/api/storage/{}", uuid::Uuid::now_v7()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
