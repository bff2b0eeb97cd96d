//! Websocket connection to the backend with auto-reconnect.
//!
//! [`WsConnection::open`] starts a background loop owning the socket and
//! returns a [`WsHandle`] for queueing commands. Commands sent while the socket
//! is down wait in the queue and go out once it reconnects. The loop ends when
//! every handle is dropped or the reconnect budget runs out.

use std::sync::Arc;

use futures_channel::mpsc::UnboundedSender;
use ltdk_shared::{ClientCommand, ListenTarget, ServerEvent, WsEnvelope};

/// Connection state for a WebSocket
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Failed { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. }
        )
    }
}

/// Configuration for auto-reconnect behavior
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of reconnect attempts (0 = infinite)
    pub max_attempts: u32,
    /// Initial delay in milliseconds
    pub initial_delay_ms: u32,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u32,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 1.5,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number
    pub fn delay_for_attempt(&self, attempt: u32) -> u32 {
        let delay = self.initial_delay_ms as f32 * self.backoff_multiplier.powi(attempt as i32);
        (delay as u32).min(self.max_delay_ms)
    }
}

pub type EventCallback = Arc<dyn Fn(WsEnvelope<ServerEvent>) + Send + Sync>;
pub type StateCallback = Arc<dyn Fn(ConnectionState) + Send + Sync>;

/// Handle for sending commands through a WebSocket connection
#[derive(Clone)]
pub struct WsHandle {
    sender: UnboundedSender<WsEnvelope<ClientCommand>>,
    pub url: String,
}

impl WsHandle {
    pub(crate) fn new(sender: UnboundedSender<WsEnvelope<ClientCommand>>, url: String) -> Self {
        Self { sender, url }
    }

    /// Queue a command. Fails once the connection loop has stopped.
    pub fn send(&self, cmd: ClientCommand) -> Result<(), String> {
        crate::log_debug!("WsHandle::send to '{}': {:?}", self.url, cmd);
        self.sender
            .unbounded_send(WsEnvelope::new(cmd))
            .map_err(|e| format!("Failed to send: {}", e))
    }

    pub fn subscribe(&self, subscription_id: &str, target: ListenTarget) -> Result<(), String> {
        self.send(ClientCommand::Subscribe {
            subscription_id: subscription_id.to_string(),
            target,
        })
    }

    pub fn unsubscribe(&self, subscription_id: &str) -> Result<(), String> {
        self.send(ClientCommand::Unsubscribe {
            subscription_id: subscription_id.to_string(),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Decode one text frame and pass it on.
fn dispatch(text: &str, on_event: &EventCallback) {
    match serde_json::from_str::<WsEnvelope<ServerEvent>>(text) {
        Ok(event) => on_event(event),
        Err(e) => crate::log_error!("Failed to parse server event: {}", e),
    }
}

pub struct WsConnection;

// Include platform-specific implementation
#[cfg(target_arch = "wasm32")]
mod connection_wasm;

#[cfg(not(target_arch = "wasm32"))]
mod connection_native;
