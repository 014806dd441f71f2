use axum::{routing::post, Router};
use std::sync::Arc;

use crate::features::webhooks::handlers;
use crate::features::webhooks::services::WebhookService;

pub fn routes(service: Arc<WebhookService>) -> Router {
    Router::new()
        .route(
            "/api/webhooks/identity",
            post(handlers::receive_identity_event),
        )
        .with_state(service)
}
