//! # Change Feed
//!
//! Push subscriptions over the store. Every successful write publishes a
//! [`ChangeEvent`] on an in-process broadcast channel; each subscription
//! re-queries its collection for its owner and hands the fresh snapshot to
//! a callback.
//!
//! ## Subscription Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  subscribe_sales(session, cb)                                           │
//! │       │                                                                 │
//! │       ├── rx = feed.receiver()        (before the first query)         │
//! │       ▼                                                                 │
//! │  tokio task ───► query() ───► cb(snapshot)     initial snapshot        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  loop rx.recv()                                                         │
//! │       ├── Ok(event) for this owner + collection ──► query() ──► cb()   │
//! │       ├── Ok(other) ──► ignore                                         │
//! │       ├── Lagged ──► query() ──► cb()     (missed events, resync)      │
//! │       └── Closed ──► stop                                              │
//! │                                                                         │
//! │  Subscription dropped / unsubscribe() ──► task aborted                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::DbResult;

/// Events buffered per receiver before it is reported as lagging.
pub const FEED_CAPACITY: usize = 256;

/// The collections a subscription can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Items,
    Sales,
    Settings,
}

/// Something in `collection` changed for `owner_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub owner_id: String,
    pub collection: Collection,
}

/// Sender side of the change feed, shared by every repository.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        ChangeFeed { tx }
    }

    /// Announces a committed write. Having no subscribers is not an error.
    pub fn publish(&self, owner_id: &str, collection: Collection) {
        debug!(owner_id = %owner_id, ?collection, "Publishing change");
        let _ = self.tx.send(ChangeEvent {
            owner_id: owner_id.to_string(),
            collection,
        });
    }

    pub fn receiver(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        ChangeFeed::new(FEED_CAPACITY)
    }
}

/// Handle to a running subscription. Delivery stops when it is dropped.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stops delivery.
    pub fn unsubscribe(self) {
        self.handle.abort();
    }

    /// False once the subscription has stopped.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns the task behind a subscription.
///
/// Must be called from within a tokio runtime.
pub fn spawn_watch<T, Q, Fut, F>(
    feed: &ChangeFeed,
    owner_id: String,
    collection: Collection,
    query: Q,
    mut on_snapshot: F,
) -> Subscription
where
    T: Send + 'static,
    Q: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DbResult<T>> + Send + 'static,
    F: FnMut(T) + Send + 'static,
{
    // subscribe before the initial query so no write can slip in between
    let mut rx = feed.receiver();

    let handle = tokio::spawn(async move {
        deliver(&query, &mut on_snapshot, &owner_id, collection).await;

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if event.collection == collection && event.owner_id == owner_id {
                        deliver(&query, &mut on_snapshot, &owner_id, collection).await;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(owner_id = %owner_id, ?collection, missed, "Subscription lagged, resyncing");
                    deliver(&query, &mut on_snapshot, &owner_id, collection).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!(owner_id = %owner_id, ?collection, "Subscription closed");
    });

    Subscription { handle }
}

async fn deliver<T, Q, Fut, F>(query: &Q, on_snapshot: &mut F, owner_id: &str, collection: Collection)
where
    Q: Fn() -> Fut,
    Fut: Future<Output = DbResult<T>>,
    F: FnMut(T),
{
    match query().await {
        Ok(snapshot) => on_snapshot(snapshot),
        Err(e) => error!(owner_id = %owner_id, ?collection, error = %e, "Subscription query failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn counting_query(counter: Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<DbResult<usize>> {
        move || std::future::ready(Ok(counter.fetch_add(1, Ordering::SeqCst) + 1))
    }

    #[tokio::test]
    async fn test_initial_snapshot_and_filtered_events() {
        let feed = ChangeFeed::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let counter = Arc::new(AtomicUsize::new(0));

        let _sub = spawn_watch(
            &feed,
            "owner-a".to_string(),
            Collection::Sales,
            counting_query(counter.clone()),
            move |n| {
                let _ = tx.send(n);
            },
        );

        let first = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(first, Some(1));

        // other owner and other collection are ignored
        feed.publish("owner-b", Collection::Sales);
        feed.publish("owner-a", Collection::Items);
        feed.publish("owner-a", Collection::Sales);

        let second = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(second, Some(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let feed = ChangeFeed::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let counter = Arc::new(AtomicUsize::new(0));

        let sub = spawn_watch(
            &feed,
            "owner-a".to_string(),
            Collection::Items,
            counting_query(counter),
            move |n| {
                let _ = tx.send(n);
            },
        );
        timeout(Duration::from_secs(5), rx.recv()).await.unwrap();

        sub.unsubscribe();
        feed.publish("owner-a", Collection::Items);

        // the callback (and its sender) is dropped with the aborted task
        let next = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(next, None);
    }
}
