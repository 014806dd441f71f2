use axum::{routing::get, Router};

use crate::features::changes::handlers;
use crate::features::changes::ChangesState;

/// Create routes for the change feed
pub fn routes(state: ChangesState) -> Router {
    Router::new()
        .route(
            "/api/orgs/{org_id}/changes",
            get(handlers::subscribe_changes),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::OrgRole;
    use crate::shared::test_helpers::{identity_for, with_identity, TestContext};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn state(ctx: &TestContext) -> ChangesState {
        ChangesState {
            access: ctx.access.clone(),
            feed: ctx.changes.clone(),
        }
    }

    #[tokio::test]
    async fn test_anonymous_subscription_is_unauthorized() {
        let ctx = TestContext::new();
        let server = TestServer::new(routes(state(&ctx))).unwrap();

        server
            .get("/api/orgs/org_1/changes")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(ctx.changes.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscription_outside_org_is_forbidden() {
        let ctx = TestContext::new();
        ctx.users.seed("user_1", &[("org_2", OrgRole::Member)]).await;
        let server = TestServer::new(with_identity(routes(state(&ctx)), identity_for("user_1")))
            .unwrap();

        server
            .get("/api/orgs/org_1/changes")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
