//! Trait definitions for the social document store.
//!
//! The hosted backend is deliberately opaque: everything the crate needs from
//! it is expressed here as typed collection operations plus two atomicity
//! primitives (unconditional batch, snapshot-read transaction) and a change
//! stream. `storage::memory::InMemoryStore` is the reference implementation.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::models::{CameraRoll, FriendRequest, PhotoRecord, Post, User, UserId};
use crate::storage::errors::StorageResult;
use crate::storage::types::{ChangeEvent, RequestFilter, WriteOp};

/// Base trait for all storage implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> StorageResult<bool>;

    /// Close connections and release resources
    async fn close(&self) -> StorageResult<()>;
}

/// Operations on the `users` collection.
#[async_trait]
pub trait UserStore: BaseStore {
    /// Create a new user document
    async fn create_user(&self, user: User) -> StorageResult<User>;

    /// Get a user by id
    async fn get_user(&self, id: &str) -> StorageResult<Option<User>>;

    /// List every user document, in arrival order
    async fn list_users(&self) -> StorageResult<Vec<User>>;
}

/// Operations on the `friendRequests` collection.
#[async_trait]
pub trait RequestStore: BaseStore {
    /// Create a new request document
    async fn create_request(&self, request: FriendRequest) -> StorageResult<FriendRequest>;

    /// Get a request by id
    async fn get_request(&self, id: &str) -> StorageResult<Option<FriendRequest>>;

    /// Query requests with equality filters
    async fn find_requests(&self, filter: RequestFilter) -> StorageResult<Vec<FriendRequest>>;

    /// Delete a request document; false when it did not exist
    async fn delete_request(&self, id: &str) -> StorageResult<bool>;
}

/// Operations on the `posts` collection.
#[async_trait]
pub trait PostStore: BaseStore {
    /// Create a new post document
    async fn create_post(&self, post: Post) -> StorageResult<Post>;

    /// Posts newer than `cutoff`, newest first
    async fn posts_since(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<Post>>;
}

/// Operations on per-user camera-roll documents.
#[async_trait]
pub trait CameraRollStore: BaseStore {
    /// Get a user's camera roll, if one exists yet
    async fn get_camera_roll(&self, user_id: &str) -> StorageResult<Option<CameraRoll>>;

    /// Append a photo record, widening the roll's timestamp bounds in the
    /// same document write
    async fn append_photo(&self, user_id: &str, record: PhotoRecord) -> StorageResult<()>;
}

/// Read-only snapshot of user documents taken at the start of a transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionSnapshot {
    users: HashMap<UserId, User>,
}

impl TransactionSnapshot {
    /// Build a snapshot from the documents a transaction read.
    pub fn new(users: HashMap<UserId, User>) -> Self {
        Self { users }
    }

    /// The user document as it was when the transaction started.
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }
}

/// Closure deciding a transaction's writes from its snapshot reads.
pub type TransactionFn =
    Box<dyn FnOnce(&TransactionSnapshot) -> StorageResult<Vec<WriteOp>> + Send>;

/// Combined trait for everything the relationship manager and read-models
/// need from the backing store.
#[async_trait]
pub trait SocialStore:
    UserStore + RequestStore + PostStore + CameraRollStore
{
    /// Atomically apply every op or none of them.
    ///
    /// Multi-entity writes (accept, block) must go through here — never
    /// through sequential independent writes.
    async fn commit_batch(&self, ops: Vec<WriteOp>) -> StorageResult<()>;

    /// Snapshot-read the named user documents, then atomically apply the ops
    /// the closure returns. Backends with optimistic concurrency retry the
    /// whole cycle on conflicting writers.
    async fn run_transaction(
        &self,
        reads: Vec<UserId>,
        apply: TransactionFn,
    ) -> StorageResult<()>;

    /// Subscribe to the change stream. Events are emitted after a write
    /// commits; receivers that fall too far behind observe a lagged error
    /// and should re-read.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
