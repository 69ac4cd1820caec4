// ── Reactive product stream ──
//
// Subscription type for consuming view changes from the store.

use std::sync::Arc;

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use invsync_api::model::Product;

type Snapshot = Arc<Vec<Arc<Product>>>;

/// A subscription to the product view.
///
/// Every full replace of the view (refresh or push) produces one new
/// snapshot; intermediate snapshots may be skipped if the consumer is
/// slow, only the latest matters.
pub struct ProductStream {
    receiver: watch::Receiver<Snapshot>,
}

impl ProductStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        Self { receiver }
    }

    /// The view as of right now (cheap `Arc` clone).
    pub fn current(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next view replacement, returning the new snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> impl Stream<Item = Snapshot> {
        WatchStream::new(self.receiver)
    }
}
