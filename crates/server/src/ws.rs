//! WebSocket handler for live queries.
//!
//! Each `subscribe` command opens a [`SnapshotStream`] on the shared store and
//! spawns a task forwarding its snapshots to the socket. `unsubscribe`, a
//! replaced subscription id, or the socket closing aborts that task, which
//! drops the stream and detaches the listener.

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use ltdk_shared::{ClientCommand, ListenTarget, Record, ServerEvent, SnapshotEvent, SnapshotStream, WsEnvelope};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::state::AppState;

type Outbox = mpsc::UnboundedSender<WsEnvelope<ServerEvent>>;

/// WebSocket upgrade handler
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let conn_id = Uuid::new_v4();
    tracing::info!(%conn_id, "WebSocket connection opened");

    let (forward_tx, mut forward_rx) = mpsc::unbounded_channel::<WsEnvelope<ServerEvent>>();
    let mut subscriptions: HashMap<String, JoinHandle<()>> = HashMap::new();

    // Task to forward events to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(event) = forward_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode server event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Main receive loop
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<WsEnvelope<ClientCommand>>(&text) {
                Ok(envelope) => handle_client_command(envelope, &mut subscriptions, &forward_tx, &state),
                Err(e) => {
                    tracing::debug!(%conn_id, "Ignoring malformed command: {}", e);
                    let _ = forward_tx.send(WsEnvelope::new(ServerEvent::Error {
                        code: "BAD_COMMAND".to_string(),
                        message: format!("Malformed command: {e}"),
                    }));
                }
            },
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    // Cleanup
    for (_, handle) in subscriptions {
        handle.abort();
    }
    send_task.abort();

    tracing::info!(%conn_id, "WebSocket connection closed");
}

fn handle_client_command(
    envelope: WsEnvelope<ClientCommand>,
    subscriptions: &mut HashMap<String, JoinHandle<()>>,
    forward_tx: &Outbox,
    state: &AppState,
) {
    // Finished forwarders leave their entry behind.
    subscriptions.retain(|_, handle| !handle.is_finished());

    match envelope.payload {
        ClientCommand::Subscribe {
            subscription_id,
            target,
        } => {
            tracing::debug!(%subscription_id, collection = target.collection(), "subscribing");

            let handle = match &target {
                ListenTarget::Query(query) => {
                    let stream = SnapshotStream::query(state.store(), query);
                    spawn_forwarder(stream, subscription_id.clone(), envelope.id.clone(), forward_tx.clone(), |id, records: Vec<Record>| {
                        ServerEvent::QuerySnapshot {
                            subscription_id: id,
                            records,
                        }
                    })
                }
                ListenTarget::Document(doc) => {
                    let stream = SnapshotStream::document(state.store(), doc);
                    spawn_forwarder(stream, subscription_id.clone(), envelope.id.clone(), forward_tx.clone(), |id, record: Option<Record>| {
                        ServerEvent::DocumentSnapshot {
                            subscription_id: id,
                            record,
                        }
                    })
                }
            };

            if let Some(previous) = subscriptions.insert(subscription_id, handle) {
                previous.abort();
            }
        }

        ClientCommand::Unsubscribe { subscription_id } => {
            tracing::debug!(%subscription_id, "unsubscribing");
            if let Some(handle) = subscriptions.remove(&subscription_id) {
                handle.abort();
            }
        }
    }
}

fn spawn_forwarder<P: Send + 'static>(
    mut stream: SnapshotStream<P>,
    subscription_id: String,
    request_id: String,
    forward_tx: Outbox,
    to_event: fn(String, P) -> ServerEvent,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = stream.next().await {
            let payload = match event {
                SnapshotEvent::Loading => continue,
                SnapshotEvent::Data(data) => to_event(subscription_id.clone(), data),
                SnapshotEvent::Error(error) => {
                    tracing::debug!(%subscription_id, %error, "subscription failed");
                    ServerEvent::SubscriptionError {
                        subscription_id: subscription_id.clone(),
                        error,
                    }
                }
            };
            if forward_tx.send(WsEnvelope::reply_to(&request_id, payload)).is_err() {
                break;
            }
        }
        tracing::debug!(%subscription_id, "subscription forwarder ended");
    })
}
