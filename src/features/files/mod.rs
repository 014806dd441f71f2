//! Files shared inside an org, soft deletion and per-user favorites.

pub mod dtos;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FileService;
