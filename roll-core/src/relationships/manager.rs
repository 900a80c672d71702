//! The relationship manager: every mutation of the social graph.

use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{FriendRequest, RequestStatus, UserId};
use crate::storage::{RequestFilter, SocialStore, WriteOp};

use super::types::{classify, RelationshipError, RelationshipState, RequestDecision};

type Result<T> = std::result::Result<T, RelationshipError>;

/// Maintains the friend / pending-request / blocked graph and its
/// invariants under concurrent mutation from multiple devices.
///
/// Every operation takes the acting user's id explicitly; there is no
/// ambient session. Writes that touch more than one document always go
/// through the store's batch or transaction primitive, so no observer ever
/// sees a half-applied accept or unfriend. Store failures are surfaced to
/// the caller with no retry and no local mutation.
pub struct RelationshipManager {
    store: Arc<dyn SocialStore>,
}

impl RelationshipManager {
    /// Create a manager on top of a social store.
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// The backing store, for read-models and collaborators.
    pub fn store(&self) -> Arc<dyn SocialStore> {
        Arc::clone(&self.store)
    }

    /// Send a friend request from `from` to `to`.
    ///
    /// Checks before creating: when an open request from `from` to `to`
    /// already exists it is returned as-is instead of creating a duplicate
    /// document. Both user documents must exist; a request from a ghost
    /// sender would only ever render as an unanswerable placeholder row.
    pub async fn send_friend_request(&self, from: &str, to: &str) -> Result<FriendRequest> {
        if from == to {
            return Err(RelationshipError::SelfTarget {
                operation: "send_friend_request",
            });
        }
        if self.store.get_user(from).await?.is_none() {
            return Err(RelationshipError::UnknownUser(from.to_string()));
        }
        if self.store.get_user(to).await?.is_none() {
            return Err(RelationshipError::UnknownUser(to.to_string()));
        }

        let open = self
            .store
            .find_requests(
                RequestFilter::new()
                    .from(from)
                    .to(to)
                    .status(RequestStatus::Pending),
            )
            .await?;
        if let Some(existing) = open.into_iter().next() {
            debug!(from, to, request_id = %existing.id, "open request already exists");
            return Ok(existing);
        }

        let request = self.store.create_request(FriendRequest::new(from, to)).await?;
        info!(from, to, request_id = %request.id, "friend request sent");
        Ok(request)
    }

    /// Retract every open request from `from` to `to`.
    ///
    /// Returns how many were deleted; zero matches is a no-op, not an error.
    pub async fn unsend_friend_request(&self, from: &str, to: &str) -> Result<usize> {
        let open = self
            .store
            .find_requests(
                RequestFilter::new()
                    .from(from)
                    .to(to)
                    .status(RequestStatus::Pending),
            )
            .await?;

        let mut deleted = 0;
        for request in open {
            if self.store.delete_request(&request.id).await? {
                deleted += 1;
            }
        }
        if deleted > 0 {
            info!(from, to, deleted, "friend request retracted");
        }
        Ok(deleted)
    }

    /// Respond to a pending request as its recipient.
    ///
    /// One atomic batch: the status write, plus on accept the two friends
    /// array-unions. Decline only writes the status; the document is kept.
    pub async fn respond_to_request(
        &self,
        request_id: &str,
        decision: RequestDecision,
        from: &str,
        to: &str,
    ) -> Result<()> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or_else(|| RelationshipError::UnknownRequest(request_id.to_string()))?;
        if request.from != from || request.to != to {
            return Err(RelationshipError::RequestMismatch(request_id.to_string()));
        }
        if !request.is_open() {
            return Err(RelationshipError::RequestNotPending(request_id.to_string()));
        }

        let mut ops = vec![WriteOp::SetRequestStatus {
            request_id: request_id.to_string(),
            status: match decision {
                RequestDecision::Accept => RequestStatus::Accepted,
                RequestDecision::Decline => RequestStatus::Declined,
            },
        }];
        if decision == RequestDecision::Accept {
            ops.push(WriteOp::FriendsUnion {
                user_id: to.to_string(),
                friend_id: from.to_string(),
            });
            ops.push(WriteOp::FriendsUnion {
                user_id: from.to_string(),
                friend_id: to.to_string(),
            });
        }

        self.store.commit_batch(ops).await?;
        info!(request_id, from, to, ?decision, "friend request answered");
        Ok(())
    }

    /// Remove the friendship between `viewer` and `other`, both sides at
    /// once.
    ///
    /// Runs as a transaction that re-reads both documents: a side already
    /// removed by a racing operation is simply skipped, and calling this
    /// when the two are not friends is a no-op.
    pub async fn unfriend(&self, viewer: &str, other: &str) -> Result<()> {
        if viewer == other {
            return Err(RelationshipError::SelfTarget {
                operation: "unfriend",
            });
        }

        let viewer_id: UserId = viewer.to_string();
        let other_id: UserId = other.to_string();
        self.store
            .run_transaction(
                vec![viewer_id.clone(), other_id.clone()],
                Box::new(move |snapshot| {
                    let mut ops = Vec::new();
                    if snapshot
                        .user(&viewer_id)
                        .is_some_and(|u| u.is_friend(&other_id))
                    {
                        ops.push(WriteOp::FriendsRemove {
                            user_id: viewer_id.clone(),
                            friend_id: other_id.clone(),
                        });
                    }
                    if snapshot
                        .user(&other_id)
                        .is_some_and(|u| u.is_friend(&viewer_id))
                    {
                        ops.push(WriteOp::FriendsRemove {
                            user_id: other_id.clone(),
                            friend_id: viewer_id.clone(),
                        });
                    }
                    Ok(ops)
                }),
            )
            .await?;

        info!(viewer, other, "unfriended");
        Ok(())
    }

    /// Block `target` on behalf of `viewer`. Wins from any prior state and
    /// is idempotent; there is no unblock operation.
    ///
    /// All four writes land in one atomic batch across both user documents:
    /// blocked-union and friends-remove on the viewer, blocked-by-union and
    /// friends-remove on the target. Pending requests are left untouched;
    /// the block preempts them at read time.
    pub async fn block(&self, viewer: &str, target: &str) -> Result<()> {
        if viewer == target {
            return Err(RelationshipError::SelfTarget { operation: "block" });
        }

        self.store
            .commit_batch(vec![
                WriteOp::BlockedUnion {
                    user_id: viewer.to_string(),
                    target_id: target.to_string(),
                },
                WriteOp::FriendsRemove {
                    user_id: viewer.to_string(),
                    friend_id: target.to_string(),
                },
                WriteOp::FriendsRemove {
                    user_id: target.to_string(),
                    friend_id: viewer.to_string(),
                },
                WriteOp::BlockedByUnion {
                    user_id: target.to_string(),
                    blocker_id: viewer.to_string(),
                },
            ])
            .await?;

        info!(viewer, target, "user blocked");
        Ok(())
    }

    /// Compute the derived relationship between `viewer` and `candidate`.
    pub async fn relationship(&self, viewer: &str, candidate: &str) -> Result<RelationshipState> {
        let viewer_doc = self
            .store
            .get_user(viewer)
            .await?
            .ok_or_else(|| RelationshipError::UnknownUser(viewer.to_string()))?;
        if viewer == candidate {
            return Ok(RelationshipState::Myself);
        }
        let candidate_doc = self
            .store
            .get_user(candidate)
            .await?
            .ok_or_else(|| RelationshipError::UnknownUser(candidate.to_string()))?;

        let mut open = self
            .store
            .find_requests(
                RequestFilter::new()
                    .from(viewer)
                    .to(candidate)
                    .status(RequestStatus::Pending),
            )
            .await?;
        open.extend(
            self.store
                .find_requests(
                    RequestFilter::new()
                        .from(candidate)
                        .to(viewer)
                        .status(RequestStatus::Pending),
                )
                .await?,
        );

        Ok(classify(&viewer_doc, &candidate_doc, &open))
    }
}

impl std::fmt::Debug for RelationshipManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipManager").finish_non_exhaustive()
    }
}
