// ── Reconciliation store ──
//
// Single point of truth for the product collection, with push-based
// change notification.

mod collection;
mod inventory_store;

pub use inventory_store::{InventoryStore, SnapshotSource};
