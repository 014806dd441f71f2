mod jwks;
mod validator;

pub mod access;
pub mod model;

pub use access::{can_delete_file, AccessService, FileAccess};
pub use jwks::JwksClient;
pub use model::AuthenticatedUser;
pub use validator::JwtValidator;
