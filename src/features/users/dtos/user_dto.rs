use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::{OrgMembership, User};

/// Public display fields of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfileDto {
    pub name: Option<String>,
    pub image: Option<String>,
}

impl UserProfileDto {
    pub fn empty() -> Self {
        Self {
            name: None,
            image: None,
        }
    }
}

impl From<&User> for UserProfileDto {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// The signed-in caller's own user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserDto {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    pub org_ids: Vec<OrgMembership>,
}

impl From<User> for CurrentUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image: user.image,
            org_ids: user.org_ids,
        }
    }
}
