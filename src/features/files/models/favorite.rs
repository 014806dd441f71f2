use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's favorite mark on a file, scoped to the file's org
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Favorite {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub org_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub org_id: String,
}
