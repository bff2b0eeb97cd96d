//! Live subscriptions as cancellable streams, and the state they drive.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_util::{Stream, StreamExt};

use crate::error::SubscriptionError;
use crate::models::{DocumentRef, QueryDescriptor, Record};
use crate::store::{DocumentStore, ListenerRegistration};

/// One step of a subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent<P> {
    Loading,
    Data(P),
    Error(SubscriptionError),
}

/// What a consumer renders from a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<SubscriptionError>,
}

pub type CollectionState = SnapshotState<Vec<Record>>;
pub type DocumentState = SnapshotState<Record>;

impl<T> SnapshotState<T> {
    pub fn idle(data: Option<T>) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    /// Fold one event into the state. Data replaces whatever was held; an
    /// error keeps the last data.
    pub fn apply<P: Into<Option<T>>>(&mut self, event: SnapshotEvent<P>) {
        match event {
            SnapshotEvent::Loading => {
                self.loading = true;
                self.error = None;
            }
            SnapshotEvent::Data(payload) => {
                self.data = payload.into();
                self.loading = false;
                self.error = None;
            }
            SnapshotEvent::Error(error) => {
                self.loading = false;
                self.error = Some(error);
            }
        }
    }
}

impl CollectionState {
    /// Starting state for a query. No query means an empty, settled result.
    pub fn for_query(query: Option<&QueryDescriptor>) -> Self {
        match query {
            Some(_) => Self::loading(),
            None => Self::idle(Some(Vec::new())),
        }
    }

    pub fn records(&self) -> &[Record] {
        self.data.as_deref().unwrap_or_default()
    }
}

impl DocumentState {
    pub fn for_document(doc: Option<&DocumentRef>) -> Self {
        match doc {
            Some(_) => Self::loading(),
            None => Self::idle(None),
        }
    }
}

/// A live subscription.
///
/// Yields `Loading` first, then one `Data` per backend push in push order.
/// After an `Error` the stream ends. Dropping the stream or calling
/// [`unsubscribe`](Self::unsubscribe) detaches the backend listener.
pub struct SnapshotStream<P> {
    receiver: UnboundedReceiver<SnapshotEvent<P>>,
    registration: Option<ListenerRegistration>,
    open: Arc<AtomicBool>,
    finished: bool,
}

impl<P> Unpin for SnapshotStream<P> {}

impl<P: Send + 'static> SnapshotStream<P> {
    fn channel() -> (
        UnboundedSender<SnapshotEvent<P>>,
        UnboundedReceiver<SnapshotEvent<P>>,
        Arc<AtomicBool>,
    ) {
        let (tx, rx) = mpsc::unbounded();
        let _ = tx.unbounded_send(SnapshotEvent::Loading);
        (tx, rx, Arc::new(AtomicBool::new(true)))
    }

    fn forward(tx: &UnboundedSender<SnapshotEvent<P>>, open: &AtomicBool, result: Result<P, SubscriptionError>) {
        if !open.load(Ordering::SeqCst) {
            return;
        }
        match result {
            Ok(payload) => {
                let _ = tx.unbounded_send(SnapshotEvent::Data(payload));
            }
            Err(error) => {
                open.store(false, Ordering::SeqCst);
                let _ = tx.unbounded_send(SnapshotEvent::Error(error));
                tx.close_channel();
            }
        }
    }

    /// Stop the subscription. Events not yet polled are discarded.
    pub fn unsubscribe(&mut self) {
        self.open.store(false, Ordering::SeqCst);
        if let Some(registration) = self.registration.take() {
            registration.remove();
        }
        self.receiver.close();
        self.finished = true;
    }

    pub fn is_active(&self) -> bool {
        !self.finished && self.open.load(Ordering::SeqCst)
    }
}

impl SnapshotStream<Vec<Record>> {
    pub fn query(store: &dyn DocumentStore, query: &QueryDescriptor) -> Self {
        let (tx, receiver, open) = Self::channel();
        let gate = open.clone();
        tracing::trace!(collection = %query.collection, "opening query subscription");
        let registration = store.listen_query(query, Arc::new(move |result| Self::forward(&tx, &gate, result)));
        Self {
            receiver,
            registration: Some(registration),
            open,
            finished: false,
        }
    }
}

impl SnapshotStream<Option<Record>> {
    pub fn document(store: &dyn DocumentStore, doc: &DocumentRef) -> Self {
        let (tx, receiver, open) = Self::channel();
        let gate = open.clone();
        tracing::trace!(doc = %doc.path(), "opening document subscription");
        let registration = store.listen_document(doc, Arc::new(move |result| Self::forward(&tx, &gate, result)));
        Self {
            receiver,
            registration: Some(registration),
            open,
            finished: false,
        }
    }
}

impl<P> Stream for SnapshotStream<P> {
    type Item = SnapshotEvent<P>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.receiver.poll_next_unpin(cx) {
            Poll::Ready(Some(SnapshotEvent::Error(error))) => {
                self.finished = true;
                self.registration.take();
                Poll::Ready(Some(SnapshotEvent::Error(error)))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::{Direction, Fields};
    use crate::store::NewDocument;
    use futures_util::FutureExt;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    /// Every event already buffered, without waiting.
    fn ready<P>(stream: &mut SnapshotStream<P>) -> Vec<SnapshotEvent<P>> {
        let mut events = Vec::new();
        while let Some(Some(event)) = stream.next().now_or_never() {
            events.push(event);
        }
        events
    }

    fn ids(event: &SnapshotEvent<Vec<Record>>) -> Vec<String> {
        match event {
            SnapshotEvent::Data(records) => records.iter().map(|r| r.id.clone()).collect(),
            other => panic!("expected data, got {other:?}"),
        }
    }

    #[test]
    fn absent_query_is_settled_and_empty() {
        let state = CollectionState::for_query(None);
        assert_eq!(state, SnapshotState::idle(Some(Vec::new())));
        assert!(!state.loading);

        let doc_state = DocumentState::for_document(None);
        assert_eq!(doc_state.data, None);
        assert!(!doc_state.loading);
    }

    #[test]
    fn query_state_moves_from_loading_to_data() {
        let store = MemoryStore::new();
        store.insert("posts", "a", fields(json!({ "title": "Kermesse" })));
        let query = QueryDescriptor::new("posts");

        let mut state = CollectionState::for_query(Some(&query));
        assert!(state.loading);
        assert_eq!(state.data, None);

        let mut stream = SnapshotStream::query(&store, &query);
        let events = ready(&mut stream);
        assert_eq!(events[0], SnapshotEvent::Loading);
        for event in events {
            state.apply(event);
        }
        assert!(!state.loading);
        assert_eq!(state.records().len(), 1);
        assert_eq!(state.records()[0].id, "a");
    }

    #[tokio::test]
    async fn equal_descriptors_get_independent_identical_streams() {
        let store = MemoryStore::new();
        let build = || QueryDescriptor::new("posts").order_by("createdAt", Direction::Desc).limit(3);

        let mut first = SnapshotStream::query(&store, &build());
        let mut second = SnapshotStream::query(&store, &build());

        for n in 0..4 {
            store
                .add(
                    "posts",
                    NewDocument::new(fields(json!({ "n": n }))).with_server_timestamp("createdAt"),
                )
                .await
                .unwrap();
        }

        let a = ready(&mut first);
        let b = ready(&mut second);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert_eq!(ids(&a[5]).len(), 3);

        first.unsubscribe();
        store.add("posts", NewDocument::default().with_server_timestamp("createdAt")).await.unwrap();
        assert!(ready(&mut first).is_empty());
        assert_eq!(ready(&mut second).len(), 1);
    }

    #[tokio::test]
    async fn pushes_after_unsubscribe_leave_state_untouched() {
        let store = MemoryStore::new();
        let query = QueryDescriptor::new("posts");
        let mut state = CollectionState::for_query(Some(&query));
        let mut stream = SnapshotStream::query(&store, &query);
        for event in ready(&mut stream) {
            state.apply(event);
        }
        let retained = state.clone();

        store.insert("posts", "late", fields(json!({})));
        stream.unsubscribe();
        store.insert("posts", "later", fields(json!({})));

        for event in ready(&mut stream) {
            state.apply(event);
        }
        assert_eq!(state, retained);
        assert!(!stream.is_active());
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn deleted_document_goes_back_to_none() {
        let store = MemoryStore::new();
        store.insert("schoolOfficials", "headmaster", fields(json!({ "name": "M. Issa" })));
        let doc = DocumentRef::new("schoolOfficials", "headmaster");

        let mut state = DocumentState::for_document(Some(&doc));
        let mut stream = SnapshotStream::document(&store, &doc);
        for event in ready(&mut stream) {
            state.apply(event);
        }
        assert_eq!(state.data.as_ref().and_then(|r| r.str_field("name")), Some("M. Issa"));

        store.delete(&doc).await.unwrap();
        for event in ready(&mut stream) {
            state.apply(event);
        }
        assert_eq!(state.data, None);
        assert!(!state.loading);
        assert!(stream.is_active());
    }

    #[test]
    fn error_keeps_previous_data_and_ends_the_stream() {
        let store = MemoryStore::new();
        store.insert("posts", "a", fields(json!({})));
        let query = QueryDescriptor::new("posts");
        let mut state = CollectionState::for_query(Some(&query));
        let mut stream = SnapshotStream::query(&store, &query);
        for event in ready(&mut stream) {
            state.apply(event);
        }

        store.revoke_reads("posts");
        let events = ready(&mut stream);
        assert!(matches!(events.as_slice(), [SnapshotEvent::Error(SubscriptionError::PermissionDenied(_))]));
        for event in events {
            state.apply(event);
        }

        assert_eq!(state.records().len(), 1);
        assert!(state.error.is_some());
        assert!(!state.loading);
        assert!(!stream.is_active());
        assert_eq!(stream.next().now_or_never(), Some(None));
    }

    #[test]
    fn refused_listener_reports_error_after_loading() {
        let store = MemoryStore::new().with_private_collections(["mentorshipRequests"]);
        let mut stream = SnapshotStream::query(&store, &QueryDescriptor::new("mentorshipRequests"));
        let events = ready(&mut stream);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SnapshotEvent::Loading);
        assert!(matches!(events[1], SnapshotEvent::Error(_)));
    }
}
