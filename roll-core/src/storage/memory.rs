//! In-memory store backend.
//!
//! Single-process reference implementation of [`SocialStore`]. One mutex
//! around the whole dataset gives batches and transactions their atomicity,
//! so `run_transaction` never needs the optimistic retry a remote backend
//! would perform. Change events are emitted after the lock is released.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{CameraRoll, FriendRequest, PhotoRecord, Post, User, UserId};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::traits::{
    BaseStore, CameraRollStore, PostStore, RequestStore, SocialStore, TransactionFn,
    TransactionSnapshot, UserStore,
};
use crate::storage::types::{ChangeAction, ChangeEvent, Collection, RequestFilter, WriteOp};

/// Capacity of the change-stream broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct Inner {
    // Vecs keep arrival order, which is the (unspecified) order the live
    // candidate subscription surfaces.
    users: Vec<User>,
    requests: Vec<FriendRequest>,
    posts: Vec<Post>,
    rolls: HashMap<UserId, CameraRoll>,
}

impl Inner {
    fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn request_mut(&mut self, id: &str) -> Option<&mut FriendRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    /// Check that every op in a batch can be applied. Nothing is mutated
    /// here; a batch with any invalid op must leave the store untouched.
    fn validate(&self, ops: &[WriteOp]) -> StorageResult<()> {
        for op in ops {
            match op {
                WriteOp::CreateRequest(request) => {
                    if self.requests.iter().any(|r| r.id == request.id) {
                        return Err(StorageError::AlreadyExists(format!(
                            "friendRequests/{}",
                            request.id
                        )));
                    }
                }
                WriteOp::SetRequestStatus { request_id, .. }
                | WriteOp::DeleteRequest { request_id } => {
                    if !self.requests.iter().any(|r| &r.id == request_id) {
                        return Err(StorageError::NotFound(format!(
                            "friendRequests/{request_id}"
                        )));
                    }
                }
                _ => {
                    // Array ops: the touched user document must exist.
                    if let Some(user_id) = op.user_id() {
                        if self.user(user_id).is_none() {
                            return Err(StorageError::NotFound(format!("users/{user_id}")));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply pre-validated ops, returning the events to broadcast.
    fn apply(&mut self, ops: Vec<WriteOp>) -> Vec<ChangeEvent> {
        let mut events = Vec::with_capacity(ops.len());
        for op in ops {
            match op {
                WriteOp::CreateRequest(request) => {
                    events.push(ChangeEvent {
                        collection: Collection::FriendRequests,
                        action: ChangeAction::Created,
                        document_id: request.id.clone(),
                    });
                    self.requests.push(request);
                }
                WriteOp::SetRequestStatus { request_id, status } => {
                    if let Some(request) = self.request_mut(&request_id) {
                        request.status = status;
                    }
                    events.push(ChangeEvent {
                        collection: Collection::FriendRequests,
                        action: ChangeAction::Updated,
                        document_id: request_id,
                    });
                }
                WriteOp::DeleteRequest { request_id } => {
                    self.requests.retain(|r| r.id != request_id);
                    events.push(ChangeEvent {
                        collection: Collection::FriendRequests,
                        action: ChangeAction::Deleted,
                        document_id: request_id,
                    });
                }
                WriteOp::FriendsUnion { user_id, friend_id } => {
                    if let Some(user) = self.user_mut(&user_id) {
                        array_union(&mut user.friends, friend_id);
                    }
                    events.push(user_updated(user_id));
                }
                WriteOp::FriendsRemove { user_id, friend_id } => {
                    if let Some(user) = self.user_mut(&user_id) {
                        user.friends.retain(|id| id != &friend_id);
                    }
                    events.push(user_updated(user_id));
                }
                WriteOp::BlockedUnion { user_id, target_id } => {
                    if let Some(user) = self.user_mut(&user_id) {
                        array_union(&mut user.blocked, target_id);
                    }
                    events.push(user_updated(user_id));
                }
                WriteOp::BlockedByUnion { user_id, blocker_id } => {
                    if let Some(user) = self.user_mut(&user_id) {
                        array_union(&mut user.blocked_by, blocker_id);
                    }
                    events.push(user_updated(user_id));
                }
            }
        }
        events
    }
}

fn array_union(values: &mut Vec<UserId>, value: UserId) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn user_updated(user_id: UserId) -> ChangeEvent {
    ChangeEvent {
        collection: Collection::Users,
        action: ChangeAction::Updated,
        document_id: user_id,
    }
}

/// In-memory [`SocialStore`] backend.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    events: broadcast::Sender<ChangeEvent>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Inner::default()),
            events,
        }
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Operation(format!("store mutex poisoned: {e}")))
    }

    fn broadcast(&self, events: Vec<ChangeEvent>) {
        for event in events {
            // Send fails only when nobody is subscribed, which is fine.
            let _ = self.events.send(event);
        }
    }
}

#[async_trait]
impl BaseStore for InMemoryStore {
    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: User) -> StorageResult<User> {
        let mut inner = self.lock()?;
        if inner.user(&user.id).is_some() {
            return Err(StorageError::AlreadyExists(format!("users/{}", user.id)));
        }
        inner.users.push(user.clone());
        drop(inner);
        self.broadcast(vec![ChangeEvent {
            collection: Collection::Users,
            action: ChangeAction::Created,
            document_id: user.id.clone(),
        }]);
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        Ok(self.lock()?.user(id).cloned())
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        Ok(self.lock()?.users.clone())
    }
}

#[async_trait]
impl RequestStore for InMemoryStore {
    async fn create_request(&self, request: FriendRequest) -> StorageResult<FriendRequest> {
        let mut inner = self.lock()?;
        inner.validate(std::slice::from_ref(&WriteOp::CreateRequest(request.clone())))?;
        let events = inner.apply(vec![WriteOp::CreateRequest(request.clone())]);
        drop(inner);
        self.broadcast(events);
        Ok(request)
    }

    async fn get_request(&self, id: &str) -> StorageResult<Option<FriendRequest>> {
        Ok(self.lock()?.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_requests(&self, filter: RequestFilter) -> StorageResult<Vec<FriendRequest>> {
        Ok(self
            .lock()?
            .requests
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn delete_request(&self, id: &str) -> StorageResult<bool> {
        let mut inner = self.lock()?;
        let before = inner.requests.len();
        inner.requests.retain(|r| r.id != id);
        let deleted = inner.requests.len() < before;
        drop(inner);
        if deleted {
            self.broadcast(vec![ChangeEvent {
                collection: Collection::FriendRequests,
                action: ChangeAction::Deleted,
                document_id: id.to_string(),
            }]);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn create_post(&self, post: Post) -> StorageResult<Post> {
        self.lock()?.posts.push(post.clone());
        self.broadcast(vec![ChangeEvent {
            collection: Collection::Posts,
            action: ChangeAction::Created,
            document_id: post.id.clone(),
        }]);
        Ok(post)
    }

    async fn posts_since(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .lock()?
            .posts
            .iter()
            .filter(|p| p.timestamp > cutoff)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(posts)
    }
}

#[async_trait]
impl CameraRollStore for InMemoryStore {
    async fn get_camera_roll(&self, user_id: &str) -> StorageResult<Option<CameraRoll>> {
        Ok(self.lock()?.rolls.get(user_id).cloned())
    }

    async fn append_photo(&self, user_id: &str, record: PhotoRecord) -> StorageResult<()> {
        let mut inner = self.lock()?;
        inner
            .rolls
            .entry(user_id.to_string())
            .or_insert_with(|| CameraRoll::new(user_id))
            .append(record);
        drop(inner);
        self.broadcast(vec![ChangeEvent {
            collection: Collection::CameraRolls,
            action: ChangeAction::Updated,
            document_id: user_id.to_string(),
        }]);
        Ok(())
    }
}

#[async_trait]
impl SocialStore for InMemoryStore {
    async fn commit_batch(&self, ops: Vec<WriteOp>) -> StorageResult<()> {
        let mut inner = self.lock()?;
        inner.validate(&ops)?;
        debug!(ops = ops.len(), "committing batch");
        let events = inner.apply(ops);
        drop(inner);
        self.broadcast(events);
        Ok(())
    }

    async fn run_transaction(
        &self,
        reads: Vec<UserId>,
        apply: TransactionFn,
    ) -> StorageResult<()> {
        let mut inner = self.lock()?;
        let mut snapshot = HashMap::new();
        for id in &reads {
            let user = inner
                .user(id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(format!("users/{id}")))?;
            snapshot.insert(id.clone(), user);
        }
        let ops = apply(&TransactionSnapshot::new(snapshot))
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        inner.validate(&ops)?;
        let events = inner.apply(ops);
        drop(inner);
        self.broadcast(events);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}
