use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::webhooks::dtos::{WebhookAckDto, WebhookEnvelopeDto};
use crate::features::webhooks::services::WebhookService;
use crate::shared::types::ApiResponse;

/// Receive an identity provider lifecycle event
///
/// Authenticated by the `svix-id`, `svix-timestamp` and `svix-signature`
/// headers. Handles `user.created`, `organizationMembership.created` and
/// `organizationMembership.updated`; other event types are acknowledged.
#[utoipa::path(
    post,
    path = "/api/webhooks/identity",
    tag = "webhooks",
    request_body = WebhookEnvelopeDto,
    responses(
        (status = 200, description = "Event acknowledged", body = ApiResponse<WebhookAckDto>),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Invalid signature"),
        (status = 404, description = "Referenced user or membership not found")
    )
)]
pub async fn receive_identity_event(
    State(service): State<Arc<WebhookService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<WebhookAckDto>>> {
    let ack = service.handle(&headers, &body).await?;
    Ok(Json(ApiResponse::success(Some(ack), None, None)))
}
