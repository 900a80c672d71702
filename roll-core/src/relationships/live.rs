//! Plumbing shared by the live read-models.
//!
//! Each read-model is one spawned task that listens on the store's change
//! stream and recomputes its value from scratch on every relevant event,
//! publishing through a watch channel. Recomputing (rather than patching)
//! is what guarantees a user who reciprocates a block mid-session drops out
//! of every list.

use futures::future::BoxFuture;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::storage::types::ChangeEvent;
use crate::storage::StorageResult;

/// Recompute closure a read-model supplies to its refresh task.
pub(crate) type RefreshFn<T> =
    Box<dyn FnMut() -> BoxFuture<'static, StorageResult<T>> + Send>;

/// Handle owning a read-model's standing watch.
///
/// The watch runs until this handle is closed or dropped; a caller that
/// holds it forever keeps an active subscription for the process lifetime.
#[derive(Debug)]
pub struct LiveHandle {
    task: JoinHandle<()>,
}

impl LiveHandle {
    /// Cancel the watch.
    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the refresh task behind a read-model.
///
/// On a lagged receiver the task refreshes anyway: missing events is fine
/// as long as the next recompute reads current state. A refresh failure is
/// logged and the previous value stays published; the next event tries
/// again.
pub(crate) fn spawn_refresh<T>(
    mut events: broadcast::Receiver<ChangeEvent>,
    tx: watch::Sender<T>,
    relevant: fn(&ChangeEvent) -> bool,
    mut refresh: RefreshFn<T>,
) -> LiveHandle
where
    T: Send + Sync + 'static,
{
    let task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if !relevant(&event) {
                        continue;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change stream lagged; refreshing from scratch");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }

            match refresh().await {
                Ok(value) => {
                    if tx.send(value).is_err() {
                        // Every receiver is gone.
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "read-model refresh failed"),
            }
        }
    });

    LiveHandle { task }
}
