//! Shared core for the LTDK site: document model, live subscriptions,
//! validated submissions and the backend connection handle.

pub mod config;
pub mod connection;
pub mod error;
pub mod memory;
pub mod models;
pub mod pipeline;
pub mod protocol;
pub mod snapshot;
pub mod store;
pub mod submissions;
pub mod validation;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use memory::MemoryStore;
pub use models::*;
pub use protocol::*;
pub use snapshot::*;
pub use store::*;
pub use submissions::*;
