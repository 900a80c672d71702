//! Live candidate list: who the viewer could send a friend request to.

use std::collections::HashSet;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;

use crate::models::{RequestStatus, UserId};
use crate::storage::{RequestFilter, SocialStore, StorageError, StorageResult};
use crate::storage::types::{ChangeEvent, Collection};

use super::live::{spawn_refresh, LiveHandle};
use super::types::RelationshipError;

/// One row of the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The candidate's id
    pub id: UserId,
    /// Display name
    pub display_name: String,
    /// Profile image URL, possibly empty
    pub profile_image: String,
    /// True iff an open request from the viewer to this candidate exists.
    /// Flips only after the store confirms the write, never optimistically.
    pub request_sent: bool,
}

/// Live read-model over every user the viewer could befriend.
///
/// Excludes the viewer, the viewer's friends, anyone the viewer has blocked
/// and anyone who has blocked the viewer. The whole filter is re-run on
/// every users or friend-requests change, so a candidate who blocks the
/// viewer mid-session disappears from the list. Ordering is arrival order
/// of the underlying subscription.
#[derive(Debug)]
pub struct CandidateList {
    rx: watch::Receiver<Vec<Candidate>>,
    handle: LiveHandle,
}

impl CandidateList {
    /// Open the read-model for `viewer` and start its standing watch.
    pub async fn open(
        store: Arc<dyn SocialStore>,
        viewer: impl Into<UserId>,
    ) -> Result<Self, RelationshipError> {
        let viewer: UserId = viewer.into();
        if store.get_user(&viewer).await?.is_none() {
            return Err(RelationshipError::UnknownUser(viewer));
        }

        // Subscribe before the initial build so no committed change falls
        // between the two.
        let events = store.subscribe();
        let initial = build(Arc::clone(&store), viewer.clone()).await?;
        let (tx, rx) = watch::channel(initial);

        let handle = spawn_refresh(
            events,
            tx,
            relevant,
            Box::new(move || build(Arc::clone(&store), viewer.clone()).boxed()),
        );

        Ok(Self { rx, handle })
    }

    /// The current candidate list.
    pub fn current(&self) -> Vec<Candidate> {
        self.rx.borrow().clone()
    }

    /// A receiver that observes every published update.
    pub fn updates(&self) -> watch::Receiver<Vec<Candidate>> {
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
        Collection::Users | Collection::FriendRequests
    )
}

async fn build(store: Arc<dyn SocialStore>, viewer: UserId) -> StorageResult<Vec<Candidate>> {
    let viewer_doc = store
        .get_user(&viewer)
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("users/{viewer}")))?;

    let sent_to: HashSet<UserId> = store
        .find_requests(
            RequestFilter::new()
                .from(viewer.clone())
                .status(RequestStatus::Pending),
        )
        .await?
        .into_iter()
        .map(|r| r.to)
        .collect();

    let candidates = store
        .list_users()
        .await?
        .into_iter()
        .filter(|user| {
            user.id != viewer
                && !viewer_doc.is_friend(&user.id)
                && !viewer_doc.has_blocked(&user.id)
                && !user.is_blocked_by(&viewer)
                && !user.has_blocked(&viewer)
        })
        .map(|user| Candidate {
            request_sent: sent_to.contains(&user.id),
            id: user.id,
            display_name: user.display_name,
            profile_image: user.profile_image,
        })
        .collect();

    Ok(candidates)
}
