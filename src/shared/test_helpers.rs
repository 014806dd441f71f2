//! In-memory doubles and fixtures shared by unit and router tests.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::Utc;
use fake::faker::name::en::Name;
use fake::Fake;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::{AccessService, AuthenticatedUser};
use crate::features::changes::ChangeFeed;
use crate::features::files::models::{Favorite, File, FileType, NewFavorite, NewFile};
use crate::features::files::repositories::{FavoriteRepository, FileRepository};
use crate::features::files::FileService;
use crate::features::users::models::{
    MembershipChange, NewUser, OrgMembership, OrgRole, User,
};
use crate::features::users::repositories::UserRepository;
use crate::features::users::UserService;
use crate::modules::storage::ObjectStore;

pub const TEST_ISSUER: &str = "https://auth.test";
pub const TEST_PUBLIC_URL: &str = "http://files.test";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

pub fn identity_for(sub: &str) -> AuthenticatedUser {
    AuthenticatedUser::new(TEST_ISSUER, sub)
}

/// Provisioning input with a generated display name
pub fn new_user(sub: &str) -> NewUser {
    NewUser {
        token_identifier: identity_for(sub).token_identifier,
        name: Some(Name().fake()),
        image: None,
    }
}

pub fn sample_file(user_id: Uuid, org_id: &str, name: &str, file_type: FileType) -> File {
    let now = Utc::now();
    File {
        id: Uuid::now_v7(),
        name: name.to_string(),
        file_type,
        org_id: org_id.to_string(),
        storage_id: Uuid::now_v7(),
        user_id,
        should_delete: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Insert a user for `sub` with the given memberships
    pub async fn seed(&self, sub: &str, orgs: &[(&str, OrgRole)]) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            token_identifier: identity_for(sub).token_identifier,
            name: Some(Name().fake()),
            image: None,
            org_ids: orgs
                .iter()
                .map(|(org_id, role)| OrgMembership {
                    org_id: org_id.to_string(),
                    role: *role,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        self.users.write().await.push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_token_identifier(&self, token_identifier: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.token_identifier == token_identifier)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.token_identifier == user.token_identifier)
        {
            return Err(AppError::Conflict(format!(
                "User with token identifier '{}' already exists",
                user.token_identifier
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            token_identifier: user.token_identifier,
            name: user.name,
            image: user.image,
            org_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn change_membership(
        &self,
        token_identifier: &str,
        change: MembershipChange<'_>,
    ) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.token_identifier == token_identifier)
            .ok_or_else(|| AppError::NotFound("Expected user to be defined".to_string()))?;
        change.apply_to(user)?;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    files: RwLock<Vec<File>>,
}

impl InMemoryFileRepository {
    pub async fn seed(&self, file: File) -> File {
        self.files.write().await.push(file.clone());
        file
    }

    pub async fn get(&self, id: Uuid) -> Option<File> {
        self.files.read().await.iter().find(|f| f.id == id).cloned()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn insert(&self, file: NewFile) -> Result<File> {
        let now = Utc::now();
        let file = File {
            id: Uuid::now_v7(),
            name: file.name,
            file_type: file.file_type,
            org_id: file.org_id,
            storage_id: file.storage_id,
            user_id: file.user_id,
            should_delete: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.seed(file).await)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>> {
        Ok(self.get(id).await)
    }

    async fn list_by_org(&self, org_id: &str) -> Result<Vec<File>> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .rev()
            .filter(|f| f.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn set_should_delete(&self, id: Uuid, should_delete: bool) -> Result<File> {
        let mut files = self.files.write().await;
        let file = files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;
        file.should_delete = Some(should_delete);
        file.updated_at = Utc::now();
        Ok(file.clone())
    }
}

#[derive(Default)]
pub struct InMemoryFavoriteRepository {
    favorites: RwLock<Vec<Favorite>>,
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn find(&self, user_id: Uuid, org_id: &str, file_id: Uuid) -> Result<Option<Favorite>> {
        Ok(self
            .favorites
            .read()
            .await
            .iter()
            .find(|f| f.user_id == user_id && f.org_id == org_id && f.file_id == file_id)
            .cloned())
    }

    async fn toggle(&self, favorite: NewFavorite) -> Result<bool> {
        let mut favorites = self.favorites.write().await;
        let before = favorites.len();
        favorites.retain(|f| {
            !(f.user_id == favorite.user_id
                && f.org_id == favorite.org_id
                && f.file_id == favorite.file_id)
        });
        if favorites.len() < before {
            return Ok(false);
        }

        favorites.push(Favorite {
            id: Uuid::now_v7(),
            file_id: favorite.file_id,
            user_id: favorite.user_id,
            org_id: favorite.org_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_for_user(&self, user_id: Uuid, org_id: &str) -> Result<Vec<Favorite>> {
        Ok(self
            .favorites
            .read()
            .await
            .iter()
            .filter(|f| f.user_id == user_id && f.org_id == org_id)
            .cloned()
            .collect())
    }
}

/// Object store that tracks which storage ids were "uploaded"
#[derive(Default)]
pub struct FakeObjectStore {
    objects: RwLock<HashSet<Uuid>>,
}

impl FakeObjectStore {
    /// Simulate a completed upload and return its storage id
    pub async fn put_object(&self) -> Uuid {
        let storage_id = Uuid::now_v7();
        self.mark_uploaded(storage_id).await;
        storage_id
    }

    /// Simulate the client PUT to an issued upload URL
    pub async fn mark_uploaded(&self, storage_id: Uuid) {
        self.objects.write().await.insert(storage_id);
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn presign_upload(&self, storage_id: Uuid) -> Result<String> {
        Ok(format!(
            "http://storage.test/fileshare/uploads/{}?X-Amz-Signature=put",
            storage_id
        ))
    }

    async fn presign_download(&self, storage_id: Uuid) -> Result<String> {
        Ok(format!(
            "http://storage.test/fileshare/uploads/{}?X-Amz-Signature=get",
            storage_id
        ))
    }

    async fn exists(&self, storage_id: Uuid) -> Result<bool> {
        Ok(self.objects.read().await.contains(&storage_id))
    }
}

/// Services wired to in-memory doubles
pub struct TestContext {
    pub users: Arc<InMemoryUserRepository>,
    pub file_repo: Arc<InMemoryFileRepository>,
    pub storage: Arc<FakeObjectStore>,
    pub changes: Arc<ChangeFeed>,
    pub access: Arc<AccessService>,
    pub files: Arc<FileService>,
    pub user_service: Arc<UserService>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_favorite_repository(Arc::new(InMemoryFavoriteRepository::default()))
    }

    pub fn with_favorite_repository(favorite_repo: Arc<dyn FavoriteRepository>) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let file_repo = Arc::new(InMemoryFileRepository::default());
        let storage = Arc::new(FakeObjectStore::default());
        let changes = Arc::new(ChangeFeed::new(16));

        let access = Arc::new(AccessService::new(users.clone(), file_repo.clone()));
        let files = Arc::new(FileService::new(
            access.clone(),
            file_repo.clone(),
            favorite_repo,
            storage.clone(),
            changes.clone(),
            TEST_PUBLIC_URL.to_string(),
        ));
        let user_service = Arc::new(UserService::new(users.clone()));

        Self {
            users,
            file_repo,
            storage,
            changes,
            access,
            files,
            user_service,
        }
    }

    pub async fn seed_file(
        &self,
        user_id: Uuid,
        org_id: &str,
        name: &str,
        file_type: FileType,
    ) -> File {
        self.file_repo
            .seed(sample_file(user_id, org_id, name, file_type))
            .await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Make every request arrive as `identity`, standing in for the bearer
/// token middleware
pub fn with_identity(router: Router, identity: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let identity = identity.clone();
            async move {
                request.extensions_mut().insert(identity);
                next.run(request).await
            }
        },
    ))
}
