//! Document store backed by the LTDK server.
//!
//! Live listeners are multiplexed over one websocket, each under its own
//! subscription id. Every active listener is re-sent to the server after a
//! reconnect, so consumers keep receiving snapshots without re-subscribing.
//! Creates go over HTTP; clients may not replace or delete documents.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, Weak};

use async_trait::async_trait;
use ltdk_shared::{
    BackendError, CreatedResponse, DocumentListener, DocumentRef, DocumentStore, ListenTarget, ListenerRegistration,
    NewDocument, QueryDescriptor, QueryListener, ServerEvent, SubscriptionError, WsEnvelope,
};

use crate::api_client::{backend_error, ApiClient};
use crate::ws::{ConnectionState, ReconnectConfig, WsConnection, WsHandle};

enum Sink {
    Query(QueryListener),
    Document(DocumentListener),
}

impl Sink {
    fn fail(&self, error: SubscriptionError) {
        match self {
            Sink::Query(listener) => listener(Err(error)),
            Sink::Document(listener) => listener(Err(error)),
        }
    }
}

impl Clone for Sink {
    fn clone(&self) -> Self {
        match self {
            Sink::Query(listener) => Sink::Query(listener.clone()),
            Sink::Document(listener) => Sink::Document(listener.clone()),
        }
    }
}

struct ActiveListen {
    target: ListenTarget,
    sink: Sink,
}

#[derive(Default)]
struct Listens {
    active: HashMap<String, ActiveListen>,
    state: Option<ConnectionState>,
    /// Set after the first successful connection; later ones re-subscribe.
    connected_before: bool,
}

struct Inner {
    api: ApiClient,
    listens: Mutex<Listens>,
}

impl Inner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Listens> {
        self.listens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn on_event(&self, envelope: WsEnvelope<ServerEvent>) {
        match envelope.payload {
            ServerEvent::QuerySnapshot {
                subscription_id,
                records,
            } => {
                let sink = self.lock().active.get(&subscription_id).map(|l| l.sink.clone());
                match sink {
                    Some(Sink::Query(listener)) => listener(Ok(records)),
                    Some(Sink::Document(_)) => {
                        crate::log_warn!("query snapshot for document subscription {}", subscription_id)
                    }
                    // Unsubscribed while the snapshot was in flight
                    None => {}
                }
            }
            ServerEvent::DocumentSnapshot {
                subscription_id,
                record,
            } => {
                let sink = self.lock().active.get(&subscription_id).map(|l| l.sink.clone());
                match sink {
                    Some(Sink::Document(listener)) => listener(Ok(record)),
                    Some(Sink::Query(_)) => {
                        crate::log_warn!("document snapshot for query subscription {}", subscription_id)
                    }
                    None => {}
                }
            }
            ServerEvent::SubscriptionError {
                subscription_id,
                error,
            } => {
                crate::log_warn!("subscription {} failed: {}", subscription_id, error);
                let removed = self.lock().active.remove(&subscription_id);
                if let Some(listen) = removed {
                    listen.sink.fail(error);
                }
            }
            ServerEvent::Error { code, message } => {
                crate::log_error!("server rejected a command ({}): {}", code, message);
            }
        }
    }

    fn on_state(&self, handle: Option<Arc<WsHandle>>, state: ConnectionState) {
        let mut listens = self.lock();
        listens.state = Some(state.clone());
        match state {
            ConnectionState::Connected => {
                if let (true, Some(handle)) = (listens.connected_before, handle) {
                    crate::log_info!("re-subscribing {} listener(s)", listens.active.len());
                    for (id, listen) in listens.active.iter() {
                        let _ = handle.subscribe(id, listen.target.clone());
                    }
                }
                listens.connected_before = true;
            }
            ConnectionState::Failed { reason } => {
                let failed: Vec<ActiveListen> = listens.active.drain().map(|(_, l)| l).collect();
                drop(listens);
                for listen in failed {
                    listen.sink.fail(SubscriptionError::Unavailable(reason.clone()));
                }
            }
            _ => {}
        }
    }
}

/// [`DocumentStore`] speaking to the server's `/api/ws` and `/api/collections` endpoints.
#[derive(Clone)]
pub struct RemoteStore {
    inner: Arc<Inner>,
    handle: Arc<WsHandle>,
}

impl RemoteStore {
    /// Start the websocket loop for `api`'s origin.
    pub fn connect(api: ApiClient) -> Self {
        Self::connect_with(api, ReconnectConfig::default())
    }

    pub fn connect_with(api: ApiClient, reconnect: ReconnectConfig) -> Self {
        let inner = Arc::new(Inner {
            api,
            listens: Mutex::new(Listens::default()),
        });

        // The state callback needs the handle the loop is about to return. It
        // holds it weakly so the loop stops once the last store clone is gone.
        let handle_slot: Arc<OnceLock<Weak<WsHandle>>> = Arc::new(OnceLock::new());

        let events = inner.clone();
        let states = inner.clone();
        let slot = handle_slot.clone();
        let handle = Arc::new(WsConnection::open(
            inner.api.ws_url(),
            reconnect,
            Arc::new(move |envelope| events.on_event(envelope)),
            Arc::new(move |state| states.on_state(slot.get().and_then(Weak::upgrade), state)),
        ));
        let _ = handle_slot.set(Arc::downgrade(&handle));

        Self { inner, handle }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Last state reported by the connection loop.
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.lock().state.clone().unwrap_or(ConnectionState::Disconnected)
    }

    pub fn active_listeners(&self) -> usize {
        self.inner.lock().active.len()
    }

    fn listen(&self, target: ListenTarget, sink: Sink) -> ListenerRegistration {
        let subscription_id = uuid::Uuid::new_v4().simple().to_string();

        let state = self.inner.lock().state.clone();
        if let Some(ConnectionState::Failed { reason }) = state {
            sink.fail(SubscriptionError::Unavailable(reason));
            return ListenerRegistration::noop();
        }

        self.inner.lock().active.insert(
            subscription_id.clone(),
            ActiveListen {
                target: target.clone(),
                sink: sink.clone(),
            },
        );

        if let Err(e) = self.handle.subscribe(&subscription_id, target) {
            self.inner.lock().active.remove(&subscription_id);
            sink.fail(SubscriptionError::Unavailable(e));
            return ListenerRegistration::noop();
        }

        let inner = self.inner.clone();
        let handle = self.handle.clone();
        ListenerRegistration::new(move || {
            let was_active = inner.lock().active.remove(&subscription_id).is_some();
            if was_active {
                let _ = handle.unsubscribe(&subscription_id);
            }
        })
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DocumentStore for RemoteStore {
    fn listen_query(&self, query: &QueryDescriptor, listener: QueryListener) -> ListenerRegistration {
        self.listen(ListenTarget::Query(query.clone()), Sink::Query(listener))
    }

    fn listen_document(&self, doc: &DocumentRef, listener: DocumentListener) -> ListenerRegistration {
        self.listen(ListenTarget::Document(doc.clone()), Sink::Document(listener))
    }

    async fn add(&self, collection: &str, document: NewDocument) -> Result<String, BackendError> {
        let path = format!("/api/collections/{}/documents", urlencoding::encode(collection));
        let created: CreatedResponse = self
            .inner
            .api
            .post_json(&path, &document)
            .await
            .map_err(backend_error)?;
        crate::log_debug!("created {}/{}", collection, created.id);
        Ok(created.id)
    }

    async fn set(&self, doc: &DocumentRef, _document: NewDocument, _merge: bool) -> Result<(), BackendError> {
        Err(BackendError::PermissionDenied(format!(
            "clients may not write {}",
            doc.path()
        )))
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), BackendError> {
        Err(BackendError::PermissionDenied(format!(
            "clients may not delete {}",
            doc.path()
        )))
    }
}
