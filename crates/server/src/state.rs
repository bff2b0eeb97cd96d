//! Application state shared across request handlers.

use ltdk_shared::{Connection, DocumentStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub connection: Connection,
    pub base_url: String,
}

impl AppState {
    pub fn new(connection: Connection, base_url: impl Into<String>) -> Self {
        Self {
            connection,
            base_url: base_url.into(),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.connection.store()
    }
}
