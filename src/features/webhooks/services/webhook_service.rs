use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::token_identifier;
use crate::features::users::models::NewUser;
use crate::features::users::UserService;
use crate::features::webhooks::dtos::{
    map_provider_role, MembershipData, UserCreatedData, WebhookAckDto, WebhookEnvelopeDto,
    MEMBERSHIP_CREATED, MEMBERSHIP_UPDATED, USER_CREATED,
};
use crate::features::webhooks::verifier::WebhookVerifier;

/// Applies identity provider lifecycle events to local users
pub struct WebhookService {
    verifier: WebhookVerifier,
    users: Arc<UserService>,
    /// Issuer the provider's tokens carry, for building token identifiers
    issuer: String,
}

impl WebhookService {
    pub fn new(verifier: WebhookVerifier, users: Arc<UserService>, issuer: String) -> Self {
        Self {
            verifier,
            users,
            issuer,
        }
    }

    /// Verify a raw delivery and apply it
    pub async fn handle(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookAckDto> {
        self.verifier.verify(headers, body).map_err(|e| {
            warn!("Rejected webhook delivery: {}", e);
            AppError::Unauthorized(e.to_string())
        })?;

        let envelope: WebhookEnvelopeDto = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

        self.dispatch(envelope).await
    }

    pub async fn dispatch(&self, envelope: WebhookEnvelopeDto) -> Result<WebhookAckDto> {
        let handled = match envelope.event_type.as_str() {
            USER_CREATED => self.user_created(decode(envelope.data)?).await?,
            MEMBERSHIP_CREATED => {
                let data: MembershipData = decode(envelope.data)?;
                self.users
                    .add_org_id_to_user(
                        &self.token_for(&data.public_user_data.user_id),
                        &data.organization.id,
                        map_provider_role(&data.role),
                    )
                    .await?;
                true
            }
            MEMBERSHIP_UPDATED => {
                let data: MembershipData = decode(envelope.data)?;
                self.users
                    .update_role_in_org_for_user(
                        &self.token_for(&data.public_user_data.user_id),
                        &data.organization.id,
                        map_provider_role(&data.role),
                    )
                    .await?;
                true
            }
            other => {
                debug!("Ignoring webhook event type {}", other);
                false
            }
        };

        Ok(WebhookAckDto { handled })
    }

    async fn user_created(&self, data: UserCreatedData) -> Result<bool> {
        let new_user = NewUser {
            token_identifier: self.token_for(&data.id),
            name: data.display_name(),
            image: data.image_url,
        };

        match self.users.create_user(new_user).await {
            Ok(_) => Ok(true),
            Err(AppError::Conflict(_)) => {
                info!("User {} already provisioned, acknowledging redelivery", data.id);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn token_for(&self, subject: &str) -> String {
        token_identifier(&self.issuer, subject)
    }
}

fn decode<T: DeserializeOwned>(data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook event data: {}", e)))
}
