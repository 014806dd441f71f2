//! In-process change feed.
//!
//! Mutations publish an event after they commit; subscribers receive every
//! event published after they subscribed and filter by org and user.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// A change clients watching an org should react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A file in the org was created, soft-deleted or restored
    FilesChanged { org_id: String },
    /// A user's favorites in the org changed
    FavoritesChanged { org_id: String, user_id: Uuid },
}

impl ChangeEvent {
    pub fn org_id(&self) -> &str {
        match self {
            ChangeEvent::FilesChanged { org_id } => org_id,
            ChangeEvent::FavoritesChanged { org_id, .. } => org_id,
        }
    }

    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::FilesChanged { .. } => "files_changed",
            ChangeEvent::FavoritesChanged { .. } => "favorites_changed",
        }
    }

    /// Favorites are private, so those events only reach their owner.
    pub fn is_visible_to(&self, org_id: &str, user_id: Uuid) -> bool {
        match self {
            ChangeEvent::FilesChanged { org_id: event_org } => event_org == org_id,
            ChangeEvent::FavoritesChanged {
                org_id: event_org,
                user_id: owner,
            } => event_org == org_id && *owner == user_id,
        }
    }
}

pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// `capacity` is the number of events a slow subscriber may fall behind
    /// before it is told to resync.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let name = event.name();
        let org_id = event.org_id().to_string();

        // Err only means nobody is subscribed
        if let Ok(receivers) = self.sender.send(event) {
            debug!(
                "Change event {} for org {} delivered to {} subscribers",
                name, org_id, receivers
            );
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
