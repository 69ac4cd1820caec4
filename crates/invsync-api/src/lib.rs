// invsync-api: Async Rust client for the inventory service (CRUD + live snapshot push)

pub mod channel;
pub mod error;
pub mod model;
pub mod products;
pub mod transport;

pub use channel::{ChannelState, LiveChannel};
pub use error::Error;
pub use model::Product;
pub use products::ProductClient;
pub use transport::TransportConfig;
