//! Relationship classification and error types.

use serde::{Deserialize, Serialize};

use crate::models::{FriendRequest, User};
use crate::storage::StorageError;

/// Error type for relationship operations
#[derive(Debug, thiserror::Error)]
pub enum RelationshipError {
    /// A self-targeting operation, rejected before any store call
    #[error("{operation} cannot target the acting user")]
    SelfTarget { operation: &'static str },

    /// A referenced user document does not exist
    #[error("User not found: {0}")]
    UnknownUser(String),

    /// A referenced request document does not exist
    #[error("Friend request not found: {0}")]
    UnknownRequest(String),

    /// The request has already been responded to or retracted
    #[error("Friend request {0} is not open")]
    RequestNotPending(String),

    /// The request does not belong to the given sender/recipient pair
    #[error("Friend request {0} does not match the given pair")]
    RequestMismatch(String),

    /// Underlying store failure, surfaced as-is with no retry
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The recipient's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDecision {
    Accept,
    Decline,
}

/// Derived relationship between a viewer and a candidate.
///
/// Never stored: computed at read time from the two user documents and any
/// open request between them. Blocks preempt everything else, including a
/// stale pending request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RelationshipState {
    /// The candidate is the viewer
    Myself,
    /// The viewer has blocked the candidate
    BlockedByViewer,
    /// The candidate has blocked the viewer
    BlockedByCandidate,
    /// Confirmed friends
    Friend,
    /// The viewer has an open request to the candidate
    PendingOutgoing,
    /// The candidate has an open request to the viewer
    PendingIncoming,
    /// No relationship
    None,
}

/// Classify the (viewer, candidate) pair.
///
/// `open_requests` holds the open (pending) requests between the two users,
/// in either direction; anything else in the slice is ignored.
pub fn classify(viewer: &User, candidate: &User, open_requests: &[FriendRequest]) -> RelationshipState {
    if viewer.id == candidate.id {
        return RelationshipState::Myself;
    }
    if viewer.has_blocked(&candidate.id) {
        return RelationshipState::BlockedByViewer;
    }
    if candidate.has_blocked(&viewer.id) || viewer.is_blocked_by(&candidate.id) {
        return RelationshipState::BlockedByCandidate;
    }
    if viewer.is_friend(&candidate.id) {
        return RelationshipState::Friend;
    }
    let outgoing = open_requests
        .iter()
        .any(|r| r.is_open() && r.from == viewer.id && r.to == candidate.id);
    if outgoing {
        return RelationshipState::PendingOutgoing;
    }
    let incoming = open_requests
        .iter()
        .any(|r| r.is_open() && r.from == candidate.id && r.to == viewer.id);
    if incoming {
        return RelationshipState::PendingIncoming;
    }
    RelationshipState::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (User, User) {
        (User::new("a", "Alice"), User::new("b", "Bob"))
    }

    #[test]
    fn classify_self() {
        let (alice, _) = pair();
        assert_eq!(classify(&alice, &alice, &[]), RelationshipState::Myself);
    }

    #[test]
    fn block_preempts_every_other_state() {
        let (mut alice, mut bob) = pair();
        // Friends and a stale pending request at the same time.
        alice.friends.push("b".to_string());
        bob.friends.push("a".to_string());
        let pending = FriendRequest::new("a", "b");

        alice.blocked.push("b".to_string());
        bob.blocked_by.push("a".to_string());

        assert_eq!(
            classify(&alice, &bob, std::slice::from_ref(&pending)),
            RelationshipState::BlockedByViewer
        );
        assert_eq!(
            classify(&bob, &alice, std::slice::from_ref(&pending)),
            RelationshipState::BlockedByCandidate
        );
    }

    #[test]
    fn friend_beats_pending() {
        let (mut alice, mut bob) = pair();
        alice.friends.push("b".to_string());
        bob.friends.push("a".to_string());
        let pending = FriendRequest::new("a", "b");

        assert_eq!(
            classify(&alice, &bob, std::slice::from_ref(&pending)),
            RelationshipState::Friend
        );
    }

    #[test]
    fn pending_direction_is_viewer_relative() {
        let (alice, bob) = pair();
        let pending = FriendRequest::new("a", "b");

        assert_eq!(
            classify(&alice, &bob, std::slice::from_ref(&pending)),
            RelationshipState::PendingOutgoing
        );
        assert_eq!(
            classify(&bob, &alice, std::slice::from_ref(&pending)),
            RelationshipState::PendingIncoming
        );
    }

    #[test]
    fn strangers_classify_as_none() {
        let (alice, bob) = pair();
        assert_eq!(classify(&alice, &bob, &[]), RelationshipState::None);
    }

    #[test]
    fn closed_requests_do_not_count_as_pending() {
        let (alice, bob) = pair();
        let mut declined = FriendRequest::new("a", "b");
        declined.status = crate::models::RequestStatus::Declined;

        assert_eq!(
            classify(&alice, &bob, std::slice::from_ref(&declined)),
            RelationshipState::None
        );
    }
}
