//! # Roll core
//!
//! Client-side core of a social photo-sharing app: the social-graph
//! relationship manager (friends, pending requests, blocks), live
//! read-models for the screens that render the graph, a time-windowed post
//! feed, and a batched photo uploader. The hosted document database and
//! blob store sit behind the [`storage::SocialStore`] and
//! [`photos::ObjectStore`] traits; an in-memory backend ships with the
//! crate and backs the test suite.
//!
//! ## Quick Start
//!
//! ```rust
//! use roll_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let manager = init_with_defaults()?;
//!     let store = manager.store();
//!
//!     store.create_user(User::new("alice", "Alice")).await?;
//!     store.create_user(User::new("bob", "Bob")).await?;
//!
//!     // Alice asks, Bob accepts; both friends arrays update atomically.
//!     let request = manager.send_friend_request("alice", "bob").await?;
//!     manager
//!         .respond_to_request(&request.id, RequestDecision::Accept, "alice", "bob")
//!         .await?;
//!
//!     assert_eq!(
//!         manager.relationship("alice", "bob").await?,
//!         RelationshipState::Friend
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Relationship manager**: the only writer of the social graph; every
//!   multi-document mutation goes through the store's batch or transaction
//!   primitive.
//! - **Read-models**: each screen list is a value on a watch channel,
//!   recomputed from scratch whenever the store's change stream reports a
//!   relevant event.
//! - **Derived state**: who-blocks-whom and pending directions are never
//!   stored; [`relationships::RelationshipState`] is computed at read time.

pub mod config;
pub mod feed;
pub mod logging;
pub mod models;
pub mod photos;
pub mod relationships;
pub mod storage;

use std::sync::Arc;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    // Re-export core initialization functions
    pub use crate::{init, init_with_defaults};

    // Re-export config types
    pub use crate::config::{
        ConfigBuilder, ConfigLoader, LogFormat, LogLevel, RollConfig, StorageBackend,
    };

    // Re-export model types
    pub use crate::models::{
        CameraRoll, FriendRequest, GeoPoint, PhotoRecord, Post, RequestStatus, User, UserId,
    };

    // Re-export the relationship manager and its read-models
    pub use crate::relationships::{
        Candidate, CandidateList, FriendList, FriendProfile, IncomingRequest, IncomingRequests,
        RelationshipError, RelationshipManager, RelationshipState, RequestDecision,
    };

    // Re-export feed and upload entry points
    pub use crate::feed::{load_feed, FeedPost, FeedView};
    pub use crate::photos::{ObjectStore, PendingPhoto, PhotoUploader, UploadSummary};

    // Re-export storage types for advanced usage
    pub use crate::storage::{
        CameraRollStore, InMemoryStore, PostStore, RequestStore, SocialStore, StorageError,
        UserStore,
    };

    // Re-export essential result type
    pub use crate::{Result, RollError};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Roll operations
#[derive(Debug, thiserror::Error)]
pub enum RollError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LogError),

    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    /// Errors related to relationship operations
    #[error("Relationship error: {0}")]
    Relationship(#[from] relationships::RelationshipError),
}

/// Result type for Roll operations
pub type Result<T> = std::result::Result<T, RollError>;

/// Initialize the Roll core with default configuration.
pub fn init_with_defaults() -> Result<relationships::RelationshipManager> {
    let config = config::ConfigBuilder::new().build()?;
    init(&config)
}

/// Initialize the Roll core with the provided configuration.
///
/// Installs the logging subscriber (tolerating one installed earlier),
/// creates the configured store and returns a relationship manager on top
/// of it. The store is shared; read-models, the feed and the uploader all
/// take clones of the same `Arc`.
pub fn init(config: &config::RollConfig) -> Result<relationships::RelationshipManager> {
    logging::init(&config.logging)?;

    let store: Arc<dyn storage::SocialStore> = storage::create_store(config)?;
    Ok(relationships::RelationshipManager::new(store))
}
