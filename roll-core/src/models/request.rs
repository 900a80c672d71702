//! Friend request document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Lifecycle status of a friend request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Created by the sender, awaiting a response from the recipient
    Pending,
    /// Accepted by the recipient; both friends arrays were updated with it
    Accepted,
    /// Declined by the recipient; the document is kept, not deleted
    Declined,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
        }
    }
}

/// A document from the `friendRequests` collection.
///
/// Requests are the only source a pending relationship can be derived from.
/// The sender creates them; only the recipient moves them to accepted or
/// declined. A request is deleted only when the sender retracts it before any
/// response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendRequest {
    /// Unique identifier for the request document
    pub id: String,

    /// Id of the sending user
    pub from: UserId,

    /// Id of the receiving user
    pub to: UserId,

    /// Current lifecycle status
    pub status: RequestStatus,

    /// When the request was created
    pub created_at: DateTime<Utc>,
}

impl FriendRequest {
    /// Create a new pending request from `from` to `to`.
    pub fn new(from: impl Into<UserId>, to: impl Into<UserId>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Whether the request is still awaiting a response.
    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
