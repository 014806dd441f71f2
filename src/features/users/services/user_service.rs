use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{CurrentUserDto, UserProfileDto};
use crate::features::users::models::{MembershipChange, NewUser, OrgRole, User};
use crate::features::users::repositories::UserRepository;

/// User provisioning and lookups.
///
/// Provisioning calls come from identity provider lifecycle events; the
/// read operations back the profile endpoints.
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Insert a user with no org memberships
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = self.users.insert(new_user).await?;
        info!("Created user {} ({})", user.id, user.token_identifier);
        Ok(user)
    }

    /// Add the user to an org. An existing membership gets its role replaced.
    pub async fn add_org_id_to_user(
        &self,
        token_identifier: &str,
        org_id: &str,
        role: OrgRole,
    ) -> Result<User> {
        let user = self
            .users
            .change_membership(token_identifier, MembershipChange::Add { org_id, role })
            .await?;
        info!("Added user {} to org {} as {}", user.id, org_id, role);
        Ok(user)
    }

    pub async fn update_role_in_org_for_user(
        &self,
        token_identifier: &str,
        org_id: &str,
        role: OrgRole,
    ) -> Result<User> {
        let user = self
            .users
            .change_membership(token_identifier, MembershipChange::SetRole { org_id, role })
            .await?;
        info!("Updated role of user {} in org {} to {}", user.id, org_id, role);
        Ok(user)
    }

    pub async fn get_user(&self, token_identifier: &str) -> Result<User> {
        self.users
            .find_by_token_identifier(token_identifier)
            .await?
            .ok_or_else(|| AppError::NotFound("Expected user to be defined".to_string()))
    }

    /// Display fields of any user. Unknown ids yield an empty profile.
    pub async fn get_user_profile(&self, user_id: Uuid) -> Result<UserProfileDto> {
        let profile = match self.users.find_by_id(user_id).await? {
            Some(user) => UserProfileDto::from(&user),
            None => {
                debug!("Profile requested for unknown user {}", user_id);
                UserProfileDto::empty()
            }
        };

        Ok(profile)
    }

    /// The caller's own user record, `None` when anonymous or not provisioned
    pub async fn get_current_user(
        &self,
        identity: Option<&AuthenticatedUser>,
    ) -> Result<Option<CurrentUserDto>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        let user = self
            .users
            .find_by_token_identifier(&identity.token_identifier)
            .await?;

        Ok(user.map(CurrentUserDto::from))
    }
}
