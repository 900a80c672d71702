//! Storage abstraction over the hosted document store.
//!
//! The relationship manager and read-models only ever talk to the
//! [`SocialStore`] trait; which backend sits behind it is a configuration
//! concern. The in-memory backend ships with the crate and backs the tests.

pub mod errors;
pub mod memory;
pub mod traits;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

pub use errors::{StorageError, StorageResult};
pub use memory::InMemoryStore;
pub use traits::{
    BaseStore, CameraRollStore, PostStore, RequestStore, SocialStore, TransactionFn,
    TransactionSnapshot, UserStore,
};
pub use types::{ChangeAction, ChangeEvent, Collection, RequestFilter, WriteOp};

use crate::config::{RollConfig, StorageBackend};
use crate::models::{User, UserId};

/// Create the store selected by the configuration.
pub fn create_store(config: &RollConfig) -> StorageResult<Arc<dyn SocialStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            debug!("creating in-memory social store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Fan-out/join detail hydration: fetch the named user documents with at
/// most `concurrency` lookups in flight, joining all results before the
/// aggregate map is returned.
///
/// Ids that resolve to no document are skipped; callers substitute their own
/// placeholder. A failed lookup fails the whole hydration, matching the
/// all-or-nothing join of the aggregate list.
pub async fn hydrate_users(
    store: &Arc<dyn SocialStore>,
    ids: &[UserId],
    concurrency: usize,
) -> StorageResult<HashMap<UserId, User>> {
    let lookups = stream::iter(ids.to_vec())
        .map(|id| {
            let store = Arc::clone(store);
            async move {
                let user = store.get_user(&id).await?;
                Ok::<_, StorageError>((id, user))
            }
        })
        .buffer_unordered(concurrency.max(1));

    let results: Vec<(UserId, Option<User>)> = lookups.try_collect().await?;

    let mut users = HashMap::with_capacity(results.len());
    for (id, user) in results {
        match user {
            Some(user) => {
                users.insert(id, user);
            }
            None => warn!(user_id = %id, "user document missing during hydration"),
        }
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hydration_joins_all_lookups_and_skips_missing() {
        let store = InMemoryStore::new();
        store.create_user(User::new("a", "Alice")).await.unwrap();
        store.create_user(User::new("b", "Bob")).await.unwrap();
        let store: Arc<dyn SocialStore> = Arc::new(store);

        let ids = vec!["a".to_string(), "ghost".to_string(), "b".to_string()];
        let users = hydrate_users(&store, &ids, 2).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users["a"].display_name, "Alice");
        assert!(!users.contains_key("ghost"));
    }
}
