//! Integration tests for the live read-models.
//!
//! Each model is driven through the store's change stream: a mutation
//! commits, the model's refresh task re-filters from scratch, and the test
//! waits for the expected value to land on the watch channel.

use std::sync::Arc;
use std::time::Duration;

use roll_core::feed::FeedView;
use roll_core::prelude::*;
use roll_core::storage::{PostStore, RequestStore, UserStore};
use tokio::sync::watch;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

async fn seeded_store() -> Arc<dyn SocialStore> {
    let store: Arc<dyn SocialStore> = Arc::new(InMemoryStore::new());
    for (id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
        store.create_user(User::new(id, name)).await.unwrap();
    }
    store
}

/// Wait until the published value satisfies `pred`, or panic after `WAIT`.
async fn wait_for<T, F>(rx: &mut watch::Receiver<Vec<T>>, pred: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&[T]) -> bool,
{
    timeout(WAIT, async {
        loop {
            {
                let current = rx.borrow_and_update();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("read-model task stopped");
        }
    })
    .await
    .expect("read-model never reached the expected value")
}

#[tokio::test]
async fn candidate_list_starts_with_everyone_else() {
    let store = seeded_store().await;
    let list = CandidateList::open(Arc::clone(&store), "alice").await.unwrap();

    let mut ids: Vec<_> = list.current().into_iter().map(|c| c.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["bob".to_string(), "carol".to_string()]);
    list.close();
}

#[tokio::test]
async fn request_sent_flips_only_after_the_store_confirms() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let list = CandidateList::open(Arc::clone(&store), "alice").await.unwrap();
    let mut rx = list.updates();

    assert!(list.current().iter().all(|c| !c.request_sent));

    manager.send_friend_request("alice", "bob").await.unwrap();
    let updated = wait_for(&mut rx, |candidates| {
        candidates.iter().any(|c| c.id == "bob" && c.request_sent)
    })
    .await;

    // Only the targeted candidate flips.
    assert!(updated
        .iter()
        .any(|c| c.id == "carol" && !c.request_sent));
    list.close();
}

#[tokio::test]
async fn a_new_friend_leaves_the_candidate_list() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let list = CandidateList::open(Arc::clone(&store), "alice").await.unwrap();
    let mut rx = list.updates();

    let request = manager.send_friend_request("alice", "bob").await.unwrap();
    manager
        .respond_to_request(&request.id, RequestDecision::Accept, "alice", "bob")
        .await
        .unwrap();

    wait_for(&mut rx, |candidates| !candidates.iter().any(|c| c.id == "bob")).await;
    list.close();
}

#[tokio::test]
async fn unsend_leaves_the_candidate_with_request_sent_cleared() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let list = CandidateList::open(Arc::clone(&store), "alice").await.unwrap();
    let mut rx = list.updates();

    manager.send_friend_request("alice", "bob").await.unwrap();
    wait_for(&mut rx, |candidates| {
        candidates.iter().any(|c| c.id == "bob" && c.request_sent)
    })
    .await;

    // Retracting flips the flag back; Bob stays listed.
    manager.unsend_friend_request("alice", "bob").await.unwrap();
    wait_for(&mut rx, |candidates| {
        candidates.iter().any(|c| c.id == "bob" && !c.request_sent)
    })
    .await;
    list.close();
}

#[tokio::test]
async fn blocking_removes_the_target_from_the_blockers_own_list() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let list = CandidateList::open(Arc::clone(&store), "alice").await.unwrap();
    let mut rx = list.updates();

    manager.block("alice", "bob").await.unwrap();

    let remaining =
        wait_for(&mut rx, |candidates| !candidates.iter().any(|c| c.id == "bob")).await;
    assert!(remaining.iter().any(|c| c.id == "carol"));
    list.close();
}

#[tokio::test]
async fn reciprocal_block_removes_the_candidate_mid_session() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let list = CandidateList::open(Arc::clone(&store), "alice").await.unwrap();
    let mut rx = list.updates();

    // Bob blocks Alice; Alice's open list must drop him without her acting.
    manager.block("bob", "alice").await.unwrap();

    wait_for(&mut rx, |candidates| !candidates.iter().any(|c| c.id == "bob")).await;
    list.close();
}

#[tokio::test]
async fn friend_list_hydrates_profiles_after_accept() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let list = FriendList::open(Arc::clone(&store), "alice", 4).await.unwrap();
    let mut rx = list.updates();

    assert!(list.current().is_empty());

    let request = manager.send_friend_request("alice", "bob").await.unwrap();
    manager
        .respond_to_request(&request.id, RequestDecision::Accept, "alice", "bob")
        .await
        .unwrap();

    let friends = wait_for(&mut rx, |friends| friends.len() == 1).await;
    assert_eq!(friends[0].id, "bob");
    assert_eq!(friends[0].display_name, "Bob");
    list.close();
}

#[tokio::test]
async fn incoming_requests_hydrate_the_sender() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let inbox = IncomingRequests::open(Arc::clone(&store), "bob", 4).await.unwrap();
    let mut rx = inbox.updates();

    manager.send_friend_request("alice", "bob").await.unwrap();

    let pending = wait_for(&mut rx, |pending| pending.len() == 1).await;
    assert_eq!(pending[0].from, "alice");
    assert_eq!(pending[0].display_name, "Alice");
    inbox.close();
}

#[tokio::test]
async fn missing_sender_shows_as_unknown_but_stays_answerable() {
    let store = seeded_store().await;
    // Request document whose sender has no user document.
    store
        .create_request(FriendRequest::new("ghost", "bob"))
        .await
        .unwrap();

    let inbox = IncomingRequests::open(Arc::clone(&store), "bob", 4).await.unwrap();
    let pending = inbox.current();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].display_name, "Unknown");
    assert!(!pending[0].request_id.is_empty());
    inbox.close();
}

#[tokio::test]
async fn answered_request_leaves_the_inbox() {
    let store = seeded_store().await;
    let manager = RelationshipManager::new(Arc::clone(&store));
    let inbox = IncomingRequests::open(Arc::clone(&store), "bob", 4).await.unwrap();
    let mut rx = inbox.updates();

    let request = manager.send_friend_request("alice", "bob").await.unwrap();
    wait_for(&mut rx, |pending| pending.len() == 1).await;

    manager
        .respond_to_request(&request.id, RequestDecision::Decline, "alice", "bob")
        .await
        .unwrap();
    wait_for(&mut rx, |pending| pending.is_empty()).await;
    inbox.close();
}

#[tokio::test]
async fn feed_view_picks_up_new_posts() {
    let store = seeded_store().await;
    let feed = FeedView::open(Arc::clone(&store), Default::default())
        .await
        .unwrap();
    let mut rx = feed.updates();

    assert!(feed.current().is_empty());

    store
        .create_post(Post::new("alice", "https://cdn.example.com/sunset.jpg"))
        .await
        .unwrap();

    let posts = wait_for(&mut rx, |posts| posts.len() == 1).await;
    assert_eq!(posts[0].poster_name, "Alice");
    feed.close();
}

#[tokio::test]
async fn opening_a_read_model_for_an_unknown_viewer_fails() {
    let store = seeded_store().await;
    assert!(matches!(
        CandidateList::open(Arc::clone(&store), "nobody").await,
        Err(RelationshipError::UnknownUser(_))
    ));
    assert!(matches!(
        FriendList::open(Arc::clone(&store), "nobody", 4).await,
        Err(RelationshipError::UnknownUser(_))
    ));
    assert!(matches!(
        IncomingRequests::open(store, "nobody", 4).await,
        Err(RelationshipError::UnknownUser(_))
    ));
}
