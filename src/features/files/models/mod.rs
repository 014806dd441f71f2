mod favorite;
mod file;

pub use favorite::{Favorite, NewFavorite};
pub use file::{File, FileRow, FileType, NewFile};
