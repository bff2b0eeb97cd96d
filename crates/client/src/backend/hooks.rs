//! Live-query hooks.
//!
//! Each hook derives a descriptor from a closure, keeps one [`SnapshotStream`]
//! open for it, and folds the stream's events into a signal. A new descriptor
//! cancels the previous stream before the next one opens; unmounting the
//! component cancels the last one. Equal descriptors keep the same stream.

use dioxus::core::Task;
use dioxus::prelude::*;
use futures_util::StreamExt;
use ltdk_shared::{
    CollectionState, DocumentRef, DocumentState, QueryDescriptor, Record, SnapshotEvent, SnapshotStream,
    SubscriptionError,
};

use super::provider::use_connection;

/// Subscribe to the records matching `query`. `None` means no subscription
/// and an empty, settled result.
pub fn use_collection(query: impl FnMut() -> Option<QueryDescriptor> + 'static) -> Signal<CollectionState> {
    let connection = use_connection();
    let descriptor = use_memo(query);
    let mut state = use_signal(|| CollectionState::for_query(descriptor.peek().as_ref()));
    let mut task = use_signal(|| None::<Task>);

    use_effect(move || {
        let query = descriptor();
        if let Some(previous) = task.write().take() {
            previous.cancel();
        }
        state.set(CollectionState::for_query(query.as_ref()));

        let Some(query) = query else {
            return;
        };
        let connection = match &connection {
            Ok(connection) => connection.clone(),
            Err(e) => {
                state
                    .write()
                    .apply::<Vec<Record>>(SnapshotEvent::Error(SubscriptionError::Internal(e.to_string())));
                return;
            }
        };

        let mut stream = SnapshotStream::query(connection.store(), &query);
        task.set(Some(spawn(async move {
            while let Some(event) = stream.next().await {
                state.write().apply(event);
            }
        })));
    });

    state
}

/// Subscribe to a single document. The state's data is `None` while the
/// document does not exist.
pub fn use_doc(doc: impl FnMut() -> Option<DocumentRef> + 'static) -> Signal<DocumentState> {
    let connection = use_connection();
    let reference = use_memo(doc);
    let mut state = use_signal(|| DocumentState::for_document(reference.peek().as_ref()));
    let mut task = use_signal(|| None::<Task>);

    use_effect(move || {
        let doc = reference();
        if let Some(previous) = task.write().take() {
            previous.cancel();
        }
        state.set(DocumentState::for_document(doc.as_ref()));

        let Some(doc) = doc else {
            return;
        };
        let connection = match &connection {
            Ok(connection) => connection.clone(),
            Err(e) => {
                state
                    .write()
                    .apply::<Option<Record>>(SnapshotEvent::Error(SubscriptionError::Internal(e.to_string())));
                return;
            }
        };

        let mut stream = SnapshotStream::document(connection.store(), &doc);
        task.set(Some(spawn(async move {
            while let Some(event) = stream.next().await {
                state.write().apply(event);
            }
        })));
    });

    state
}
