// invsync-core: Reactive data layer between invsync-api and consumers.

pub mod config;
pub mod error;
pub mod inventory;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::InventoryConfig;
pub use error::CoreError;
pub use inventory::Inventory;
pub use store::{InventoryStore, SnapshotSource};
pub use stream::ProductStream;

// Re-export the wire types consumers render; the domain shape and the
// wire shape are one and the same for this protocol.
pub use invsync_api::model::Product;
pub use invsync_api::{ChannelState, Error as ApiError};
