//! User document model

use serde::{Deserialize, Serialize};

/// Stable identifier for a user document.
pub type UserId = String;

/// A user document from the `users` collection.
///
/// `friends` is kept symmetric across documents, but only by the relationship
/// manager's batched writes — a single-sided write is never valid. `blocked`
/// and `blocked_by` are asymmetric inverses: `b` appears in `a.blocked_by`
/// exactly when `a` appears in `b.blocked`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique identifier for the user
    pub id: UserId,

    /// Display name shown in lists
    pub display_name: String,

    /// Profile image URL, empty string when the user has none
    #[serde(default)]
    pub profile_image: String,

    /// Ids of confirmed friends
    #[serde(default)]
    pub friends: Vec<UserId>,

    /// Ids this user has blocked
    #[serde(default)]
    pub blocked: Vec<UserId>,

    /// Ids of users who have blocked this user (derived inverse of `blocked`)
    #[serde(default)]
    pub blocked_by: Vec<UserId>,
}

impl User {
    /// Create a new user with no relationships.
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            profile_image: String::new(),
            friends: Vec::new(),
            blocked: Vec::new(),
            blocked_by: Vec::new(),
        }
    }

    /// Set the profile image URL.
    pub fn with_profile_image(mut self, url: impl Into<String>) -> Self {
        self.profile_image = url.into();
        self
    }

    /// Whether `other` is a confirmed friend of this user.
    pub fn is_friend(&self, other: &str) -> bool {
        self.friends.iter().any(|id| id == other)
    }

    /// Whether this user has blocked `other`.
    pub fn has_blocked(&self, other: &str) -> bool {
        self.blocked.iter().any(|id| id == other)
    }

    /// Whether `other` has blocked this user.
    pub fn is_blocked_by(&self, other: &str) -> bool {
        self.blocked_by.iter().any(|id| id == other)
    }
}
