//! Identity provider lifecycle webhooks.
//!
//! Users and org memberships are provisioned from signed provider events
//! rather than through the public API.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod verifier;

pub use routes::routes;
pub use services::WebhookService;
pub use verifier::WebhookVerifier;
