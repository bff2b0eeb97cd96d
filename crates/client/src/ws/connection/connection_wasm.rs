//! WASM/Web-specific WebSocket implementation using web_sys::WebSocket.

use futures_channel::mpsc::{unbounded, UnboundedReceiver};
use futures_util::future::{select, Either};
use futures_util::StreamExt;
use ltdk_shared::{ClientCommand, WsEnvelope};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{js_sys, CloseEvent, MessageEvent, WebSocket};

use super::{dispatch, ConnectionState, EventCallback, ReconnectConfig, StateCallback, WsConnection, WsHandle};

/// How long to wait for the socket to open.
const OPEN_TIMEOUT_MS: u32 = 5000;

impl WsConnection {
    /// Start the connection loop on the browser's event loop.
    pub fn open(
        url: String,
        reconnect_config: ReconnectConfig,
        on_event: EventCallback,
        on_state: StateCallback,
    ) -> WsHandle {
        let (sender, receiver) = unbounded();
        spawn_local(run(url.clone(), receiver, reconnect_config, on_event, on_state));
        WsHandle::new(sender, url)
    }
}

async fn run(
    url: String,
    mut receiver: UnboundedReceiver<WsEnvelope<ClientCommand>>,
    reconnect_config: ReconnectConfig,
    on_event: EventCallback,
    on_state: StateCallback,
) {
    let mut attempt = 0u32;

    loop {
        if attempt == 0 {
            on_state(ConnectionState::Connecting);
        } else {
            on_state(ConnectionState::Reconnecting { attempt });
        }

        match connect_websocket(&url, on_event.clone()).await {
            Ok((ws, mut closed)) => {
                attempt = 0;
                crate::log_info!("WebSocket connected to {}", url);
                on_state(ConnectionState::Connected);

                let keep_running = loop {
                    match select(receiver.next(), closed.next()).await {
                        Either::Left((Some(cmd), _)) => {
                            if ws.ready_state() != WebSocket::OPEN {
                                break true;
                            }
                            match serde_json::to_string(&cmd) {
                                Ok(json) => {
                                    if let Err(e) = ws.send_with_str(&json) {
                                        crate::log_error!("Send failed: {:?}", e);
                                    }
                                }
                                Err(e) => crate::log_error!("Serialize failed: {}", e),
                            }
                        }
                        Either::Left((None, _)) => {
                            let _ = ws.close();
                            break false;
                        }
                        Either::Right(_) => break true,
                    }
                };

                on_state(ConnectionState::Disconnected);
                if !keep_running {
                    crate::log_info!("All handles dropped, stopping connection to {}", url);
                    return;
                }
            }
            Err(e) => {
                crate::log_error!("WebSocket error for {}: {}", url, e);

                if reconnect_config.max_attempts > 0 && attempt >= reconnect_config.max_attempts {
                    on_state(ConnectionState::Failed {
                        reason: format!(
                            "Max reconnect attempts ({}) exceeded",
                            reconnect_config.max_attempts
                        ),
                    });
                    return;
                }

                let delay = reconnect_config.delay_for_attempt(attempt);
                crate::log_info!("Reconnecting to {} in {}ms (attempt {})", url, delay, attempt + 1);
                gloo_timers::future::TimeoutFuture::new(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Open a socket and wait until it is usable.
///
/// Returns the socket and a receiver that yields once it closes.
async fn connect_websocket(
    url: &str,
    on_event: EventCallback,
) -> Result<(WebSocket, UnboundedReceiver<String>), String> {
    let ws = WebSocket::new(url).map_err(|e| format!("Failed to create WebSocket: {:?}", e))?;

    let (opened_tx, mut opened_rx) = unbounded::<Result<(), String>>();
    let (closed_tx, closed_rx) = unbounded::<String>();

    let open_tx = opened_tx.clone();
    let onopen_callback = Closure::wrap(Box::new(move |_: web_sys::Event| {
        let _ = open_tx.unbounded_send(Ok(()));
    }) as Box<dyn FnMut(web_sys::Event)>);
    ws.set_onopen(Some(onopen_callback.as_ref().unchecked_ref()));
    onopen_callback.forget();

    let fail_tx = opened_tx.clone();
    let onclose_callback = Closure::wrap(Box::new(move |e: CloseEvent| {
        let reason = if e.reason().is_empty() {
            format!("Code {}", e.code())
        } else {
            e.reason()
        };
        crate::log_info!("WebSocket onclose: {}", reason);
        let _ = fail_tx.unbounded_send(Err(reason.clone()));
        let _ = closed_tx.unbounded_send(reason);
    }) as Box<dyn FnMut(CloseEvent)>);
    ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
    onclose_callback.forget();

    let onerror_callback = Closure::wrap(Box::new(move |_: web_sys::ErrorEvent| {
        crate::log_error!("WebSocket onerror fired");
        let _ = opened_tx.unbounded_send(Err("WebSocket error".to_string()));
    }) as Box<dyn FnMut(web_sys::ErrorEvent)>);
    ws.set_onerror(Some(onerror_callback.as_ref().unchecked_ref()));
    onerror_callback.forget();

    let onmessage_callback = Closure::wrap(Box::new(move |e: MessageEvent| {
        if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
            let text: String = text.into();
            dispatch(&text, &on_event);
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    ws.set_onmessage(Some(onmessage_callback.as_ref().unchecked_ref()));
    onmessage_callback.forget();

    let timeout = gloo_timers::future::TimeoutFuture::new(OPEN_TIMEOUT_MS);
    match select(opened_rx.next(), timeout).await {
        Either::Left((Some(Ok(())), _)) => Ok((ws, closed_rx)),
        Either::Left((Some(Err(reason)), _)) => Err(reason),
        Either::Left((None, _)) => Err("WebSocket dropped before opening".to_string()),
        Either::Right(_) => {
            let _ = ws.close();
            Err("Connection timeout".to_string())
        }
    }
}
