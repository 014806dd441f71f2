mod favorite_repository;
mod file_repository;

pub use favorite_repository::{FavoriteRepository, PgFavoriteRepository};
pub use file_repository::{FileRepository, PgFileRepository};
