// ── Central reconciliation store ──
//
// Owns the visible product collection and applies full-collection
// replacements from both channels: CRUD-driven refreshes and live push
// snapshots. Whichever completes last is authoritative — the wire
// protocol carries no version numbers, so arrival order is the only
// ordering available.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use invsync_api::model::Product;

use super::collection::ProductCollection;
use crate::stream::ProductStream;

/// Which channel produced a snapshot.
///
/// Both sources replace the collection wholesale; the tag exists so the
/// decision point is explicit and observable rather than an incidental
/// overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Result of a `list()` call triggered locally.
    Refresh,
    /// Unsolicited push from the live channel.
    Push,
}

/// Reconciliation store: the single point of truth consumers observe.
pub struct InventoryStore {
    products: ProductCollection,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    last_push: watch::Sender<Option<DateTime<Utc>>>,
    loaded: watch::Sender<bool>,
}

impl InventoryStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        let (last_push, _) = watch::channel(None);
        let (loaded, _) = watch::channel(false);

        Self {
            products: ProductCollection::new(),
            last_refresh,
            last_push,
            loaded,
        }
    }

    // ── Read model ───────────────────────────────────────────────────

    /// The latest merged view, as an ordered read-only snapshot.
    pub fn products(&self) -> Arc<Vec<Arc<Product>>> {
        self.products.snapshot()
    }

    /// Indexed lookup by id.
    pub fn product(&self, id: i64) -> Option<Arc<Product>> {
        self.products.get(id)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> ProductStream {
        ProductStream::new(self.products.subscribe())
    }

    // ── Snapshot application ─────────────────────────────────────────

    /// Apply a full-collection snapshot from either channel.
    ///
    /// Unconditional replace: no merge with whatever was visible before,
    /// including pending local state. Most-recent-completion wins.
    pub fn apply_snapshot(&self, source: SnapshotSource, products: Vec<Product>) {
        tracing::debug!(?source, products = products.len(), "applying snapshot");
        self.products.replace_all(products);

        let now = Some(Utc::now());
        match source {
            SnapshotSource::Refresh => {
                let _ = self.last_refresh.send(now);
            }
            SnapshotSource::Push => {
                let _ = self.last_push.send(now);
            }
        }
    }

    /// Record that an initial load attempt has completed, successfully
    /// or not. A failed refresh leaves the previous view intact but
    /// still counts — stale-but-available.
    pub fn mark_loaded(&self) {
        let _ = self.loaded.send(true);
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub fn last_push(&self) -> Option<DateTime<Utc>> {
        *self.last_push.borrow()
    }

    /// How long ago the view was last replaced from either channel,
    /// or `None` if it never was.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        let latest = match (self.last_refresh(), self.last_push()) {
            (Some(r), Some(p)) => Some(r.max(p)),
            (r, p) => r.or(p),
        };
        latest.map(|t| Utc::now() - t)
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64) -> Product {
        Product {
            id,
            brand: "Acme".into(),
            category: "tools".into(),
            quantity: 1,
            price: 1.0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn starts_empty_and_unloaded() {
        let store = InventoryStore::new();
        assert!(store.products().is_empty());
        assert!(!store.loaded());
        assert!(store.data_age().is_none());
    }

    #[test]
    fn push_replaces_push() {
        let store = InventoryStore::new();
        store.apply_snapshot(SnapshotSource::Push, vec![product(1)]);
        store.apply_snapshot(SnapshotSource::Push, vec![product(2)]);

        let view = store.products();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 2);
    }

    #[test]
    fn last_completion_wins_across_sources() {
        let store = InventoryStore::new();
        store.apply_snapshot(SnapshotSource::Refresh, vec![product(1)]);
        store.apply_snapshot(SnapshotSource::Push, vec![product(2)]);
        assert_eq!(store.products()[0].id, 2);

        store.apply_snapshot(SnapshotSource::Refresh, vec![product(3)]);
        assert_eq!(store.products()[0].id, 3);
    }

    #[test]
    fn sources_stamp_their_own_timestamps() {
        let store = InventoryStore::new();
        store.apply_snapshot(SnapshotSource::Refresh, vec![product(1)]);
        assert!(store.last_refresh().is_some());
        assert!(store.last_push().is_none());

        store.apply_snapshot(SnapshotSource::Push, Vec::new());
        assert!(store.last_push().is_some());
        assert!(store.data_age().is_some());
    }

    #[test]
    fn mark_loaded_without_data() {
        let store = InventoryStore::new();
        store.mark_loaded();
        assert!(store.loaded());
        assert!(store.products().is_empty());
    }
}
