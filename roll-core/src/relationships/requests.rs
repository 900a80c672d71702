//! Live inbox of pending friend requests, hydrated with sender profiles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::watch;

use crate::models::{RequestStatus, UserId};
use crate::storage::types::{ChangeEvent, Collection};
use crate::storage::{hydrate_users, RequestFilter, SocialStore, StorageResult};

use super::live::{spawn_refresh, LiveHandle};
use super::types::RelationshipError;

/// Placeholder name for a sender whose user document is missing.
const UNKNOWN_SENDER: &str = "Unknown";

/// A pending request joined with its sender's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequest {
    /// Id of the request document, needed to respond to it
    pub request_id: String,
    /// The sender's id
    pub from: UserId,
    /// The sender's display name, or "Unknown" when their document is gone
    pub display_name: String,
    /// The sender's profile image URL, possibly empty
    pub profile_image: String,
    /// When the request was created
    pub created_at: DateTime<Utc>,
}

/// Live read-model over the viewer's pending incoming requests.
///
/// Each refresh queries the open requests addressed to the viewer and
/// hydrates the senders with a bounded fan-out. A missing sender document
/// does not drop the request; the row is kept with a placeholder name so
/// it can still be answered.
#[derive(Debug)]
pub struct IncomingRequests {
    rx: watch::Receiver<Vec<IncomingRequest>>,
    handle: LiveHandle,
}

impl IncomingRequests {
    /// Open the read-model for `viewer` with at most `concurrency` sender
    /// lookups in flight per refresh.
    pub async fn open(
        store: Arc<dyn SocialStore>,
        viewer: impl Into<UserId>,
        concurrency: usize,
    ) -> Result<Self, RelationshipError> {
        let viewer: UserId = viewer.into();
        if store.get_user(&viewer).await?.is_none() {
            return Err(RelationshipError::UnknownUser(viewer));
        }

        let events = store.subscribe();
        let initial = build(Arc::clone(&store), viewer.clone(), concurrency).await?;
        let (tx, rx) = watch::channel(initial);

        let handle = spawn_refresh(
            events,
            tx,
            relevant,
            Box::new(move || build(Arc::clone(&store), viewer.clone(), concurrency).boxed()),
        );

        Ok(Self { rx, handle })
    }

    /// The current inbox.
    pub fn current(&self) -> Vec<IncomingRequest> {
        self.rx.borrow().clone()
    }

    /// A receiver that observes every published update.
    pub fn updates(&self) -> watch::Receiver<Vec<IncomingRequest>> {
        self.rx.clone()
    }

    /// Release the standing watch.
    pub fn close(self) {
        self.handle.close();
    }
}

fn relevant(event: &ChangeEvent) -> bool {
    matches!(
        event.collection,
        Collection::FriendRequests | Collection::Users
    )
}

async fn build(
    store: Arc<dyn SocialStore>,
    viewer: UserId,
    concurrency: usize,
) -> StorageResult<Vec<IncomingRequest>> {
    let pending = store
        .find_requests(
            RequestFilter::new()
                .to(viewer)
                .status(RequestStatus::Pending),
        )
        .await?;

    let sender_ids: Vec<UserId> = pending.iter().map(|r| r.from.clone()).collect();
    let senders = hydrate_users(&store, &sender_ids, concurrency).await?;

    Ok(pending
        .into_iter()
        .map(|request| {
            let (display_name, profile_image) = match senders.get(&request.from) {
                Some(user) => (user.display_name.clone(), user.profile_image.clone()),
                None => (UNKNOWN_SENDER.to_string(), String::new()),
            };
            IncomingRequest {
                request_id: request.id,
                from: request.from,
                display_name,
                profile_image,
                created_at: request.created_at,
            }
        })
        .collect())
}
