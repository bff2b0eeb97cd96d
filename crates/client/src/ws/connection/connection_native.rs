//! Native/Desktop WebSocket implementation using tokio-tungstenite.

use futures_channel::mpsc::{unbounded, UnboundedReceiver};
use futures_util::{SinkExt, StreamExt};
use ltdk_shared::{ClientCommand, WsEnvelope};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{dispatch, ConnectionState, EventCallback, ReconnectConfig, StateCallback, WsConnection, WsHandle};

impl WsConnection {
    /// Start the connection loop on the current tokio runtime.
    pub fn open(
        url: String,
        reconnect_config: ReconnectConfig,
        on_event: EventCallback,
        on_state: StateCallback,
    ) -> WsHandle {
        let (sender, receiver) = unbounded();
        tokio::spawn(run(url.clone(), receiver, reconnect_config, on_event, on_state));
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

        match connect_async(url.as_str()).await {
            Ok((ws_stream, _response)) => {
                attempt = 0;
                crate::log_info!("WebSocket connected to {}", url);
                on_state(ConnectionState::Connected);

                let (mut write, mut read) = ws_stream.split();

                // false once every handle is gone
                let keep_running = loop {
                    tokio::select! {
                        incoming = read.next() => match incoming {
                            Some(Ok(Message::Text(text))) => dispatch(&text, &on_event),
                            Some(Ok(Message::Close(_))) | None => {
                                crate::log_info!("WebSocket to {} closed by server", url);
                                break true;
                            }
                            // Pings are answered by tungstenite
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                crate::log_error!("WebSocket read error: {}", e);
                                break true;
                            }
                        },
                        outgoing = receiver.next() => match outgoing {
                            Some(cmd) => match serde_json::to_string(&cmd) {
                                Ok(json) => {
                                    if let Err(e) = write.send(Message::Text(json.into())).await {
                                        crate::log_error!("Send failed: {}", e);
                                        break true;
                                    }
                                }
                                Err(e) => crate::log_error!("Serialize failed: {}", e),
                            },
                            None => {
                                let _ = write.close().await;
                                break false;
                            }
                        },
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
                tokio::time::sleep(tokio::time::Duration::from_millis(delay as u64)).await;
                attempt += 1;
            }
        }
    }
}
