//! Org and file access checks shared by every file operation.
//!
//! A caller may act inside an org when their user row lists the org among its
//! memberships, or when the org id is their personal workspace (the org id is
//! embedded in the token identifier).

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::models::File;
use crate::features::files::repositories::FileRepository;
use crate::features::users::models::{OrgRole, User};
use crate::features::users::repositories::UserRepository;

/// Caller's user row together with a file they can reach
#[derive(Debug, Clone)]
pub struct FileAccess {
    pub user: User,
    pub file: File,
}

pub struct AccessService {
    users: Arc<dyn UserRepository>,
    files: Arc<dyn FileRepository>,
}

impl AccessService {
    pub fn new(users: Arc<dyn UserRepository>, files: Arc<dyn FileRepository>) -> Self {
        Self { users, files }
    }

    /// Resolve the caller's user row if they may act inside `org_id`.
    ///
    /// Returns `None` for anonymous callers, callers without a user row, and
    /// callers outside the org.
    pub async fn has_access_to_org(
        &self,
        identity: Option<&AuthenticatedUser>,
        org_id: &str,
    ) -> Result<Option<User>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        let Some(user) = self
            .users
            .find_by_token_identifier(&identity.token_identifier)
            .await?
        else {
            debug!(
                "No user row for token identifier {}",
                identity.token_identifier
            );
            return Ok(None);
        };

        if !user.can_access_org(org_id) {
            debug!("User {} has no access to org {}", user.id, org_id);
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Resolve the file and the caller's user row if the file exists and the
    /// caller has access to its org.
    pub async fn has_access_to_file(
        &self,
        identity: Option<&AuthenticatedUser>,
        file_id: Uuid,
    ) -> Result<Option<FileAccess>> {
        let Some(file) = self.files.find_by_id(file_id).await? else {
            return Ok(None);
        };

        let user = self.has_access_to_org(identity, &file.org_id).await?;

        Ok(user.map(|user| FileAccess { user, file }))
    }
}

/// Owners and admins of the file's org may delete or restore it
pub fn can_delete_file(user: &User, file: &File) -> bool {
    file.user_id == user.id || user.role_in(&file.org_id) == Some(OrgRole::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::models::FileType;
    use crate::shared::test_helpers::{
        identity_for, sample_file, InMemoryFileRepository, InMemoryUserRepository,
    };

    fn setup() -> (
        AccessService,
        Arc<InMemoryUserRepository>,
        Arc<InMemoryFileRepository>,
    ) {
        let users = Arc::new(InMemoryUserRepository::default());
        let files = Arc::new(InMemoryFileRepository::default());
        let service = AccessService::new(users.clone(), files.clone());
        (service, users, files)
    }

    #[tokio::test]
    async fn test_anonymous_caller_has_no_access() {
        let (service, _, _) = setup();
        let access = service.has_access_to_org(None, "org_1").await.unwrap();
        assert!(access.is_none());
    }

    #[tokio::test]
    async fn test_identity_without_user_row_has_no_access() {
        let (service, _, _) = setup();
        let identity = identity_for("user_ghost");
        let access = service
            .has_access_to_org(Some(&identity), "org_1")
            .await
            .unwrap();
        assert!(access.is_none());
    }

    #[tokio::test]
    async fn test_member_and_personal_workspace_access() {
        let (service, users, _) = setup();
        let user = users
            .seed("user_alice", &[("org_1", OrgRole::Member)])
            .await;
        let identity = identity_for("user_alice");

        let in_org = service
            .has_access_to_org(Some(&identity), "org_1")
            .await
            .unwrap();
        assert_eq!(in_org.map(|u| u.id), Some(user.id));

        let personal = service
            .has_access_to_org(Some(&identity), "user_alice")
            .await
            .unwrap();
        assert!(personal.is_some());

        let other = service
            .has_access_to_org(Some(&identity), "org_2")
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_issuer_fragments_and_other_subjects_are_not_workspaces() {
        let (service, users, _) = setup();
        users.seed("user_ab", &[]).await;
        users.seed("user_abc", &[]).await;
        let identity = identity_for("user_abc");

        for org_id in ["https", "auth", "user_", "user_ab"] {
            let access = service
                .has_access_to_org(Some(&identity), org_id)
                .await
                .unwrap();
            assert!(access.is_none(), "{} must be denied", org_id);
        }

        let own = service
            .has_access_to_org(Some(&identity), "user_abc")
            .await
            .unwrap();
        assert!(own.is_some());
    }

    #[tokio::test]
    async fn test_file_access_follows_file_org() {
        let (service, users, files) = setup();
        let owner = users.seed("user_owner", &[("org_1", OrgRole::Member)]).await;
        users.seed("user_outsider", &[("org_2", OrgRole::Admin)]).await;
        let file = files
            .seed(sample_file(owner.id, "org_1", "report.pdf", FileType::Pdf))
            .await;

        let granted = service
            .has_access_to_file(Some(&identity_for("user_owner")), file.id)
            .await
            .unwrap();
        assert!(granted.is_some());

        let denied = service
            .has_access_to_file(Some(&identity_for("user_outsider")), file.id)
            .await
            .unwrap();
        assert!(denied.is_none());

        let missing = service
            .has_access_to_file(Some(&identity_for("user_owner")), Uuid::now_v7())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_can_delete_file_owner_or_admin() {
        let (_, users, _) = setup();
        let owner = users.seed("user_owner", &[("org_1", OrgRole::Member)]).await;
        let admin = users.seed("user_admin", &[("org_1", OrgRole::Admin)]).await;
        let member = users.seed("user_member", &[("org_1", OrgRole::Member)]).await;
        let foreign_admin = users.seed("user_foreign", &[("org_2", OrgRole::Admin)]).await;
        let file = sample_file(owner.id, "org_1", "a.png", FileType::Image);

        assert!(can_delete_file(&owner, &file));
        assert!(can_delete_file(&admin, &file));
        assert!(!can_delete_file(&member, &file));
        assert!(!can_delete_file(&foreign_admin, &file));
    }
}
