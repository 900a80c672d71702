//! Live friend list with hydrated profiles.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;

use crate::models::UserId;
use crate::storage::types::{ChangeEvent, Collection};
use crate::storage::{hydrate_users, SocialStore, StorageError, StorageResult};

use super::live::{spawn_refresh, LiveHandle};
use super::types::RelationshipError;

/// A hydrated entry of the friend list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendProfile {
    pub id: UserId,
    pub display_name: String,
    pub profile_image: String,
}

/// Live read-model over the viewer's confirmed friends.
///
/// The friends array holds bare ids; each refresh hydrates them into
/// profiles with a bounded fan-out, preserving the array's order. A friend
/// whose document has vanished is dropped from the list rather than shown
/// as a ghost entry.
#[derive(Debug)]
pub struct FriendList {
    rx: watch::Receiver<Vec<FriendProfile>>,
    handle: LiveHandle,
}

impl FriendList {
    /// Open the read-model for `viewer` with at most `concurrency` profile
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

    /// The current friend list.
    pub fn current(&self) -> Vec<FriendProfile> {
        self.rx.borrow().clone()
    }

    /// A receiver that observes every published update.
    pub fn updates(&self) -> watch::Receiver<Vec<FriendProfile>> {
        self.rx.clone()
    }

    /// Release the standing watch.
    pub fn close(self) {
        self.handle.close();
    }
}

fn relevant(event: &ChangeEvent) -> bool {
    event.collection == Collection::Users
}

async fn build(
    store: Arc<dyn SocialStore>,
    viewer: UserId,
    concurrency: usize,
) -> StorageResult<Vec<FriendProfile>> {
    let viewer_doc = store
        .get_user(&viewer)
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("users/{viewer}")))?;

    let mut hydrated = hydrate_users(&store, &viewer_doc.friends, concurrency).await?;

    Ok(viewer_doc
        .friends
        .iter()
        .filter_map(|id| hydrated.remove(id))
        .map(|user| FriendProfile {
            id: user.id,
            display_name: user.display_name,
            profile_image: user.profile_image,
        })
        .collect())
}
