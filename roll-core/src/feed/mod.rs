//! Time-windowed post feed with hydrated poster details.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::FutureExt;
use tokio::sync::watch;

use crate::config::FeedConfig;
use crate::models::UserId;
use crate::relationships::live::{spawn_refresh, LiveHandle};
use crate::relationships::RelationshipError;
use crate::storage::types::{ChangeEvent, Collection};
use crate::storage::{hydrate_users, SocialStore, StorageResult};

/// Placeholder name for a poster whose user document is missing.
const UNKNOWN_POSTER: &str = "Unknown";

/// A post joined with its poster's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    pub id: String,
    /// URL of the posted picture
    pub picture: String,
    /// The poster's id
    pub poster: UserId,
    /// The poster's display name, or "Unknown" when their document is gone
    pub poster_name: String,
    /// The poster's profile image URL, possibly empty
    pub poster_image: String,
    pub timestamp: DateTime<Utc>,
}

/// Load the feed once: posts inside the window, newest first, posters
/// hydrated with a bounded fan-out. The window reaches back
/// `config.window_days` days from now.
pub async fn load_feed(
    store: &Arc<dyn SocialStore>,
    config: &FeedConfig,
) -> StorageResult<Vec<FeedPost>> {
    build(Arc::clone(store), config.clone()).await
}

/// Live read-model over the feed, re-built on every post or user change.
#[derive(Debug)]
pub struct FeedView {
    rx: watch::Receiver<Vec<FeedPost>>,
    handle: LiveHandle,
}

impl FeedView {
    /// Open the feed and start its standing watch.
    pub async fn open(
        store: Arc<dyn SocialStore>,
        config: FeedConfig,
    ) -> Result<Self, RelationshipError> {
        let events = store.subscribe();
        let initial = build(Arc::clone(&store), config.clone()).await?;
        let (tx, rx) = watch::channel(initial);

        let handle = spawn_refresh(
            events,
            tx,
            relevant,
            Box::new(move || build(Arc::clone(&store), config.clone()).boxed()),
        );

        Ok(Self { rx, handle })
    }

    /// The current feed.
    pub fn current(&self) -> Vec<FeedPost> {
        self.rx.borrow().clone()
    }

    /// A receiver that observes every published update.
    pub fn updates(&self) -> watch::Receiver<Vec<FeedPost>> {
        self.rx.clone()
    }

    /// Release the standing watch.
    pub fn close(self) {
        self.handle.close();
    }
}

fn relevant(event: &ChangeEvent) -> bool {
    matches!(event.collection, Collection::Posts | Collection::Users)
}

async fn build(store: Arc<dyn SocialStore>, config: FeedConfig) -> StorageResult<Vec<FeedPost>> {
    let cutoff = Utc::now() - Duration::days(i64::from(config.window_days));
    let posts = store.posts_since(cutoff).await?;

    let poster_ids: Vec<UserId> = posts.iter().map(|p| p.poster.clone()).collect();
    let posters = hydrate_users(&store, &poster_ids, config.hydration_concurrency).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let (poster_name, poster_image) = match posters.get(&post.poster) {
                Some(user) => (user.display_name.clone(), user.profile_image.clone()),
                None => (UNKNOWN_POSTER.to_string(), String::new()),
            };
            FeedPost {
                id: post.id,
                picture: post.picture,
                poster: post.poster,
                poster_name,
                poster_image,
                timestamp: post.timestamp,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, User};
    use crate::storage::{InMemoryStore, PostStore, UserStore};

    async fn seeded_store() -> Arc<dyn SocialStore> {
        let store = InMemoryStore::new();
        store.create_user(User::new("a", "Alice")).await.unwrap();
        store
            .create_post(Post::new("a", "https://cdn/p1.jpg"))
            .await
            .unwrap();
        store
            .create_post(Post::new("ghost", "https://cdn/p2.jpg"))
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn feed_hydrates_posters_with_unknown_fallback() {
        let store = seeded_store().await;
        let feed = load_feed(&store, &FeedConfig::default()).await.unwrap();

        assert_eq!(feed.len(), 2);
        let by_alice = feed.iter().find(|p| p.poster == "a").unwrap();
        assert_eq!(by_alice.poster_name, "Alice");
        let orphan = feed.iter().find(|p| p.poster == "ghost").unwrap();
        assert_eq!(orphan.poster_name, "Unknown");
        assert!(orphan.poster_image.is_empty());
    }

    #[tokio::test]
    async fn feed_is_newest_first_within_window() {
        let store = seeded_store().await;
        let feed = load_feed(&store, &FeedConfig::default()).await.unwrap();

        for pair in feed.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[tokio::test]
    async fn old_posts_fall_outside_the_window() {
        let store = InMemoryStore::new();
        store.create_user(User::new("a", "Alice")).await.unwrap();
        let mut stale = Post::new("a", "https://cdn/old.jpg");
        stale.timestamp = Utc::now() - Duration::days(30);
        store.create_post(stale).await.unwrap();
        let store: Arc<dyn SocialStore> = Arc::new(store);

        let feed = load_feed(&store, &FeedConfig::default()).await.unwrap();
        assert!(feed.is_empty());
    }
}
