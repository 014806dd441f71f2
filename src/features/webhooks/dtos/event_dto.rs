use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::users::models::OrgRole;

pub const USER_CREATED: &str = "user.created";
pub const MEMBERSHIP_CREATED: &str = "organizationMembership.created";
pub const MEMBERSHIP_UPDATED: &str = "organizationMembership.updated";

/// Delivery envelope. `data` is decoded according to `type`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookEnvelopeDto {
    #[serde(rename = "type")]
    pub event_type: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreatedData {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl UserCreatedData {
    /// First and last name joined, `None` when both are blank
    pub fn display_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipData {
    pub organization: MembershipOrganization,
    pub public_user_data: MembershipUser,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipOrganization {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipUser {
    pub user_id: String,
}

/// Map a provider role (`org:admin`, `admin`, `org:member`, ...) to an org role
pub fn map_provider_role(role: &str) -> OrgRole {
    match role.strip_prefix("org:").unwrap_or(role) {
        "admin" => OrgRole::Admin,
        _ => OrgRole::Member,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAckDto {
    /// Whether the event changed anything
    pub handled: bool,
}
