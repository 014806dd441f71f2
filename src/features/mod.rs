pub mod auth;
pub mod changes;
pub mod files;
pub mod users;
pub mod webhooks;
