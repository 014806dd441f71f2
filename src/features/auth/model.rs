use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Verified caller identity extracted from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject claim (the identity provider's user id)
    pub sub: String,
    /// `"{issuer}|{sub}"`, the join key to the `users` table
    pub token_identifier: String,
}

impl AuthenticatedUser {
    pub fn new(issuer: &str, sub: impl Into<String>) -> Self {
        let sub = sub.into();
        Self {
            token_identifier: token_identifier(issuer, &sub),
            sub,
        }
    }
}

/// Build the token identifier for a subject issued by `issuer`.
pub fn token_identifier(issuer: &str, sub: &str) -> String {
    format!("{}|{}", issuer.trim_end_matches('/'), sub)
}
