//! Write operations, change events and query filters for the social store.

use serde::{Deserialize, Serialize};

use crate::models::{FriendRequest, RequestStatus, UserId};

/// Logical collections of the backing document store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    FriendRequests,
    Posts,
    CameraRolls,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Users => write!(f, "users"),
            Self::FriendRequests => write!(f, "friendRequests"),
            Self::Posts => write!(f, "posts"),
            Self::CameraRolls => write!(f, "cameraRolls"),
        }
    }
}

/// What happened to a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// A change-stream event pushed to live subscribers after a committed write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Collection the document lives in
    pub collection: Collection,
    /// What happened to it
    pub action: ChangeAction,
    /// Id of the changed document
    pub document_id: String,
}

/// A single document mutation inside an atomic batch or transaction.
///
/// Array operations carry set semantics: union is idempotent and remove
/// skips values that are already absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Create a friend request document
    CreateRequest(FriendRequest),
    /// Overwrite the status field of a request
    SetRequestStatus { request_id: String, status: RequestStatus },
    /// Delete a request document
    DeleteRequest { request_id: String },
    /// Array-union `friend_id` into `user_id`'s friends
    FriendsUnion { user_id: UserId, friend_id: UserId },
    /// Array-remove `friend_id` from `user_id`'s friends
    FriendsRemove { user_id: UserId, friend_id: UserId },
    /// Array-union `target_id` into `user_id`'s blocked list
    BlockedUnion { user_id: UserId, target_id: UserId },
    /// Array-union `blocker_id` into `user_id`'s blocked-by list
    BlockedByUnion { user_id: UserId, blocker_id: UserId },
}

impl WriteOp {
    /// The user document this op touches, when it touches one.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::FriendsUnion { user_id, .. }
            | Self::FriendsRemove { user_id, .. }
            | Self::BlockedUnion { user_id, .. }
            | Self::BlockedByUnion { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}

/// Equality filter for querying the `friendRequests` collection.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Match the sending user
    pub from: Option<UserId>,
    /// Match the receiving user
    pub to: Option<UserId>,
    /// Match the lifecycle status
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    /// Create an empty filter matching every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by sender.
    pub fn from(mut self, from: impl Into<UserId>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Filter by recipient.
    pub fn to(mut self, to: impl Into<UserId>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Filter by status.
    pub fn status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether `request` matches every set field.
    pub fn matches(&self, request: &FriendRequest) -> bool {
        if let Some(from) = &self.from {
            if &request.from != from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if &request.to != to {
                return false;
            }
        }
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_on_all_set_fields() {
        let request = FriendRequest::new("alice", "bob");

        assert!(RequestFilter::new().matches(&request));
        assert!(RequestFilter::new().from("alice").to("bob").matches(&request));
        assert!(RequestFilter::new()
            .status(RequestStatus::Pending)
            .matches(&request));
        assert!(!RequestFilter::new().from("bob").matches(&request));
        assert!(!RequestFilter::new()
            .status(RequestStatus::Accepted)
            .matches(&request));
    }
}
