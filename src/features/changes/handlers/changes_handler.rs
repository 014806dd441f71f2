use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::extractor::MaybeUser;
use crate::features::auth::{AccessService, AuthenticatedUser};
use crate::features::changes::feed::ChangeEvent;
use crate::features::changes::ChangesState;

/// Event sent when a subscriber fell behind and must refetch its queries
pub const RESYNC_EVENT: &str = "resync";

/// Subscribe to changes in an org
///
/// Streams `files_changed` and `favorites_changed` events as Server-Sent
/// Events. Clients refetch the affected queries on receipt. A `resync` event
/// means some events were dropped and everything should be refetched.
/// Access is checked again before each event; the stream ends once the
/// caller has lost access to the org.
#[utoipa::path(
    get,
    path = "/api/orgs/{org_id}/changes",
    tag = "changes",
    params(
        ("org_id" = String, Path, description = "Organization or personal workspace id")
    ),
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = ChangeEvent),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "No access to the org")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn subscribe_changes(
    State(state): State<ChangesState>,
    MaybeUser(identity): MaybeUser,
    Path(org_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let identity =
        identity.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let user = state
        .access
        .has_access_to_org(Some(&identity), &org_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("You do not have access to this org".to_string()))?;

    debug!("User {} subscribed to changes in org {}", user.id, org_id);

    let subscription = Arc::new(Subscription {
        access: state.access.clone(),
        identity,
        org_id,
        user_id: user.id,
    });

    let stream = BroadcastStream::new(state.feed.subscribe())
        .then(move |item| {
            let subscription = subscription.clone();
            async move { subscription.deliver(item).await }
        })
        .take_while(|delivery| !matches!(delivery, Delivery::Revoked))
        .filter_map(|delivery| match delivery {
            Delivery::Event(event) => Some(Ok::<_, Infallible>(event)),
            Delivery::Skip | Delivery::Revoked => None,
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// What to do with one item received from the feed
enum Delivery {
    Event(Event),
    Skip,
    /// The subscriber lost access to the org
    Revoked,
}

struct Subscription {
    access: Arc<AccessService>,
    identity: AuthenticatedUser,
    org_id: String,
    user_id: Uuid,
}

impl Subscription {
    async fn deliver(&self, item: Result<ChangeEvent, BroadcastStreamRecvError>) -> Delivery {
        let event = match item {
            Ok(event) if event.is_visible_to(&self.org_id, self.user_id) => event,
            Ok(_) => return Delivery::Skip,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(
                    "Change subscriber for org {} lagged by {} events",
                    self.org_id, skipped
                );
                return Delivery::Event(
                    Event::default()
                        .event(RESYNC_EVENT)
                        .data(skipped.to_string()),
                );
            }
        };

        match self
            .access
            .has_access_to_org(Some(&self.identity), &self.org_id)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(
                    "User {} lost access to org {}, closing change stream",
                    self.user_id, self.org_id
                );
                return Delivery::Revoked;
            }
            Err(e) => {
                warn!(
                    "Access check for change stream of org {} failed: {}",
                    self.org_id, e
                );
                return Delivery::Revoked;
            }
        }

        match to_sse_event(&event) {
            Some(sse_event) => Delivery::Event(sse_event),
            None => Delivery::Skip,
        }
    }
}

fn to_sse_event(event: &ChangeEvent) -> Option<Event> {
    Event::default()
        .event(event.name())
        .json_data(event)
        .map_err(|e| warn!("Failed to encode change event: {}", e))
        .ok()
}
