pub mod feed;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::features::auth::AccessService;

pub use feed::{ChangeEvent, ChangeFeed};
pub use routes::routes;

/// State shared by the change feed handlers
#[derive(Clone)]
pub struct ChangesState {
    pub access: Arc<AccessService>,
    pub feed: Arc<ChangeFeed>,
}
