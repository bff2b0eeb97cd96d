//! Websocket transport for live queries.
//!
//! ```text
//!   RemoteStore ──subscribe/unsubscribe──▶ WsHandle ──▶ connection loop ──▶ server
//!        ▲                                                   │
//!        └────────────── on_event(snapshot) ◀────────────────┘
//! ```
//!
//! The connection loop is platform specific (tokio-tungstenite on desktop,
//! `web_sys::WebSocket` in the browser); everything above it is shared.

mod connection;

pub use connection::{ConnectionState, EventCallback, ReconnectConfig, StateCallback, WsConnection, WsHandle};
