// ── Ordered reactive product collection ──
//
// Full-replace storage with O(1) id lookups and push-based change
// notification via `watch` channels. There are deliberately no partial
// mutation entry points: every write is an atomic snapshot replacement,
// so readers never observe an in-between state.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use invsync_api::model::Product;

/// The reactive collection backing the store.
///
/// Holds the ordered snapshot behind a `watch` channel and a `DashMap`
/// index for id lookups. Order follows the incoming snapshot; if the
/// server sends duplicate ids, the last occurrence wins (both in the
/// index and in the ordered view, which keeps one row per id).
pub(crate) struct ProductCollection {
    /// Secondary index: id -> product.
    by_id: DashMap<i64, Arc<Product>>,

    /// Version counter, bumped on every replace.
    version: watch::Sender<u64>,

    /// Ordered snapshot, rebuilt wholesale on every replace.
    snapshot: watch::Sender<Arc<Vec<Arc<Product>>>>,
}

impl ProductCollection {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the entire collection. Never merges.
    pub(crate) fn replace_all(&self, products: Vec<Product>) {
        let mut ordered: Vec<Arc<Product>> = Vec::with_capacity(products.len());
        let mut position: std::collections::HashMap<i64, usize> =
            std::collections::HashMap::with_capacity(products.len());

        for product in products {
            let product = Arc::new(product);
            if let Some(&at) = position.get(&product.id) {
                // Duplicate id within one snapshot: last occurrence wins.
                ordered[at] = product;
            } else {
                position.insert(product.id, ordered.len());
                ordered.push(product);
            }
        }

        self.by_id.clear();
        for product in &ordered {
            self.by_id.insert(product.id, Arc::clone(product));
        }

        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(ordered));
        self.version.send_modify(|v| *v += 1);
    }

    /// Look up a product by id.
    pub(crate) fn get(&self, id: i64) -> Option<Arc<Product>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<Product>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Product>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }
}
