//! Users and their org memberships.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Caller's user record, null when anonymous |
//! | GET | `/api/users/{id}/profile` | Display name and image of any user |
//!
//! Users are provisioned by identity provider webhooks, not through this API.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::UserService;
