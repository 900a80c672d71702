//! Post document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// A document from the `posts` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Unique identifier for the post
    pub id: String,

    /// URL of the posted picture
    pub picture: String,

    /// Id of the user who posted it
    pub poster: UserId,

    /// When the post was created
    pub timestamp: DateTime<Utc>,
}

impl Post {
    /// Create a new post timestamped now.
    pub fn new(poster: impl Into<UserId>, picture: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            picture: picture.into(),
            poster: poster.into(),
            timestamp: Utc::now(),
        }
    }
}
