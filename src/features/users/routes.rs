use crate::features::users::handlers;
use crate::features::users::services::UserService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/me", get(handlers::get_current_user))
        .route("/api/users/{id}/profile", get(handlers::get_user_profile))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::dtos::{CurrentUserDto, UserProfileDto};
    use crate::features::users::models::OrgRole;
    use crate::shared::test_helpers::{identity_for, with_identity, TestContext};
    use crate::shared::types::ApiResponse;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_current_user() {
        let ctx = TestContext::new();
        let user = ctx.users.seed("user_1", &[("org_1", OrgRole::Admin)]).await;

        let anonymous = TestServer::new(routes(ctx.user_service.clone())).unwrap();
        let response = anonymous.get("/api/users/me").await;
        response.assert_status_ok();
        assert!(response
            .json::<ApiResponse<CurrentUserDto>>()
            .data
            .is_none());

        let signed_in = TestServer::new(with_identity(
            routes(ctx.user_service.clone()),
            identity_for("user_1"),
        ))
        .unwrap();
        let current = signed_in
            .get("/api/users/me")
            .await
            .json::<ApiResponse<CurrentUserDto>>()
            .data
            .unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.org_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_user_profile() {
        let ctx = TestContext::new();
        let user = ctx.users.seed("user_1", &[]).await;
        let server = TestServer::new(routes(ctx.user_service.clone())).unwrap();

        let profile = server
            .get(&format!("/api/users/{}/profile", user.id))
            .await
            .json::<ApiResponse<UserProfileDto>>()
            .data
            .unwrap();
        assert_eq!(profile.name, user.name);

        let unknown = server
            .get(&format!("/api/users/{}/profile", uuid::Uuid::now_v7()))
            .await
            .json::<ApiResponse<UserProfileDto>>()
            .data
            .unwrap();
        assert_eq!(unknown, UserProfileDto::empty());
    }
}
