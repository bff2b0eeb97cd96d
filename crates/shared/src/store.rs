//! The document store seam.
//!
//! Both the authoritative in-process store on the server and the websocket
//! backed store on the client implement [`DocumentStore`]. Listeners receive a
//! full replacement snapshot on every change.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, SubscriptionError};
use crate::models::{DocumentRef, Fields, QueryDescriptor, Record, Timestamp};

pub type QueryListener = Arc<dyn Fn(Result<Vec<Record>, SubscriptionError>) + Send + Sync>;
pub type DocumentListener = Arc<dyn Fn(Result<Option<Record>, SubscriptionError>) + Send + Sync>;

/// Fields to write, plus the fields the backend fills with its own clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_timestamps: Vec<String>,
}

impl NewDocument {
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            server_timestamps: Vec::new(),
        }
    }

    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }

    /// Stored form of the document once the backend clock reads `now`.
    pub fn resolve(self, now: Timestamp) -> Fields {
        let mut fields = self.fields;
        for field in self.server_timestamps {
            fields.insert(field, now.to_value());
        }
        fields
    }
}

/// Handle to an active listener. Dropping it detaches the listener.
#[must_use = "dropping the registration detaches the listener"]
pub struct ListenerRegistration {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A registration with nothing to detach, e.g. for a listener that failed on open.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    /// Detach the listener. No callback runs for it once this returns.
    pub fn remove(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Live reads and writes against a set of named collections.
///
/// A listener that receives an error is detached by the store and never
/// called again.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait DocumentStore: Send + Sync {
    fn listen_query(&self, query: &QueryDescriptor, listener: QueryListener) -> ListenerRegistration;

    fn listen_document(&self, doc: &DocumentRef, listener: DocumentListener) -> ListenerRegistration;

    /// Append a document with a backend-assigned id.
    async fn add(&self, collection: &str, document: NewDocument) -> Result<String, BackendError>;

    /// Write a document at a known id, replacing it or merging into it.
    async fn set(&self, doc: &DocumentRef, document: NewDocument, merge: bool) -> Result<(), BackendError>;

    async fn delete(&self, doc: &DocumentRef) -> Result<(), BackendError>;
}
