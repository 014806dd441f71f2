use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::models::{Favorite, NewFavorite};

/// Persistence for `favorites` rows
#[async_trait]
pub trait FavoriteRepository: Send + Sync + 'static {
    async fn find(&self, user_id: Uuid, org_id: &str, file_id: Uuid) -> Result<Option<Favorite>>;

    /// Remove the (user, org, file) favorite if it exists, otherwise add it.
    /// Toggles by the same user are serialized. Returns whether the file is a
    /// favorite afterwards.
    async fn toggle(&self, favorite: NewFavorite) -> Result<bool>;

    async fn list_for_user(&self, user_id: Uuid, org_id: &str) -> Result<Vec<Favorite>>;
}

pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn find(&self, user_id: Uuid, org_id: &str, file_id: Uuid) -> Result<Option<Favorite>> {
        let favorite = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, file_id, user_id, org_id, created_at
            FROM favorites
            WHERE user_id = $1 AND org_id = $2 AND file_id = $3
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite)
    }

    async fn toggle(&self, favorite: NewFavorite) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Lock the user row so toggles by the same user run one at a time
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(favorite.user_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query_scalar::<_, Uuid>(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND org_id = $2 AND file_id = $3
            RETURNING id
            "#,
        )
        .bind(favorite.user_id)
        .bind(&favorite.org_id)
        .bind(favorite.file_id)
        .fetch_optional(&mut *tx)
        .await?;

        if removed.is_none() {
            sqlx::query(
                r#"
                INSERT INTO favorites (id, file_id, user_id, org_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, org_id, file_id) DO NOTHING
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(favorite.file_id)
            .bind(favorite.user_id)
            .bind(&favorite.org_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed.is_none())
    }

    async fn list_for_user(&self, user_id: Uuid, org_id: &str) -> Result<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, file_id, user_id, org_id, created_at
            FROM favorites
            WHERE user_id = $1 AND org_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(favorites)
    }
}
