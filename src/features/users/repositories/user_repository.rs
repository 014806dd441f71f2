use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::users::models::{MembershipChange, NewUser, User, UserRow};

/// Persistence for `users` rows
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_token_identifier(&self, token_identifier: &str) -> Result<Option<User>>;

    /// Insert a user with no org memberships. Duplicate tokens are `Conflict`.
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// Apply a membership change to the user with `token_identifier` while
    /// holding its row, so concurrent changes never overwrite each other.
    /// An unknown user is `NotFound`.
    async fn change_membership(
        &self,
        token_identifier: &str,
        change: MembershipChange<'_>,
    ) -> Result<User>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, token_identifier, name, image, org_ids, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_token_identifier(&self, token_identifier: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, token_identifier, name, image, org_ids, created_at, updated_at
            FROM users
            WHERE token_identifier = $1
            "#,
        )
        .bind(token_identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, token_identifier, name, image, org_ids)
            VALUES ($1, $2, $3, $4, '[]'::jsonb)
            RETURNING id, token_identifier, name, image, org_ids, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&user.token_identifier)
        .bind(&user.name)
        .bind(&user.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "User with token identifier '{}' already exists",
                    user.token_identifier
                ))
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(row.into())
    }

    async fn change_membership(
        &self,
        token_identifier: &str,
        change: MembershipChange<'_>,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, token_identifier, name, image, org_ids, created_at, updated_at
            FROM users
            WHERE token_identifier = $1
            FOR UPDATE
            "#,
        )
        .bind(token_identifier)
        .fetch_optional(&mut *tx)
        .await?;

        let mut user = row
            .map(User::from)
            .ok_or_else(|| AppError::NotFound("Expected user to be defined".to_string()))?;
        change.apply_to(&mut user)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET org_ids = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, token_identifier, name, image, org_ids, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(Json(&user.org_ids))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }
}
