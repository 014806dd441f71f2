use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;

/// Role of a user inside an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    Admin,
    Member,
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Admin => "admin",
            OrgRole::Member => "member",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(OrgRole::Admin),
            "member" => Ok(OrgRole::Member),
            other => Err(format!("Unknown org role: {}", other)),
        }
    }
}

/// One organization a user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrgMembership {
    pub org_id: String,
    pub role: OrgRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub token_identifier: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub org_ids: Vec<OrgMembership>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Role held in `org_id`, if the user is a member
    pub fn role_in(&self, org_id: &str) -> Option<OrgRole> {
        self.org_ids
            .iter()
            .find(|m| m.org_id == org_id)
            .map(|m| m.role)
    }

    pub fn is_member_of(&self, org_id: &str) -> bool {
        self.org_ids.iter().any(|m| m.org_id == org_id)
    }

    /// Provider user id, the part of the token identifier after the last `|`
    pub fn subject(&self) -> Option<&str> {
        self.token_identifier
            .rsplit_once('|')
            .map(|(_, sub)| sub)
            .filter(|sub| !sub.is_empty())
    }

    /// Whether the user may act inside `org_id`.
    ///
    /// A personal workspace uses the provider's user id as org id, so it must
    /// equal the subject exactly.
    pub fn can_access_org(&self, org_id: &str) -> bool {
        if org_id.is_empty() {
            return false;
        }
        self.is_member_of(org_id) || self.subject() == Some(org_id)
    }

    /// Add a membership, or replace the role when the org is already present
    pub fn upsert_membership(&mut self, org_id: &str, role: OrgRole) {
        match self.org_ids.iter_mut().find(|m| m.org_id == org_id) {
            Some(existing) => existing.role = role,
            None => self.org_ids.push(OrgMembership {
                org_id: org_id.to_string(),
                role,
            }),
        }
    }

    /// Change the role of an existing membership. Returns false if absent.
    pub fn set_role(&mut self, org_id: &str, role: OrgRole) -> bool {
        match self.org_ids.iter_mut().find(|m| m.org_id == org_id) {
            Some(existing) => {
                existing.role = role;
                true
            }
            None => false,
        }
    }
}

/// An edit to a user's memberships, applied under a row lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange<'a> {
    /// Join the org, or replace the role when already a member
    Add { org_id: &'a str, role: OrgRole },
    /// Change the role in an org the user already belongs to
    SetRole { org_id: &'a str, role: OrgRole },
}

impl MembershipChange<'_> {
    /// Apply to `user`. `SetRole` on a missing membership is `NotFound`.
    pub fn apply_to(self, user: &mut User) -> Result<(), AppError> {
        match self {
            MembershipChange::Add { org_id, role } => {
                user.upsert_membership(org_id, role);
                Ok(())
            }
            MembershipChange::SetRole { org_id, role } => {
                if user.set_role(org_id, role) {
                    Ok(())
                } else {
                    Err(AppError::NotFound(format!(
                        "Expected org {} on user {}",
                        org_id, user.id
                    )))
                }
            }
        }
    }
}

/// Database row for `users`
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub token_identifier: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub org_ids: Json<Vec<OrgMembership>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            token_identifier: row.token_identifier,
            name: row.name,
            image: row.image,
            org_ids: row.org_ids.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for provisioning a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub token_identifier: String,
    pub name: Option<String>,
    pub image: Option<String>,
}
