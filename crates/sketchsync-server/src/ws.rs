//! `WebSocket` push channel.
//!
//! A client connecting to `GET /ws` is registered with the hub and first
//! receives an `INIT` frame holding the whole log, then one `DRAW` frame
//! per appended event, in log order. Clients may send `DRAW` frames of
//! their own; these are appended exactly like `POST /draw`, and fan out to
//! every subscriber including the sender.
//!
//! A failed send or a close frame ends the connection and unsubscribes it.
//! Other subscribers are never affected.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use sketchsync_core::Subscription;
use sketchsync_types::PushMessage;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` push subscription.
///
/// # Route
///
/// `GET /ws` (and `GET /`)
pub async fn ws_draw(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Forward the subscription's messages to the socket and apply inbound
/// draws until either side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let Subscription { id, mut receiver } = state.hub.subscribe();
    debug!(subscriber = %id, "WebSocket client connected");

    loop {
        tokio::select! {
            outgoing = receiver.recv() => {
                let Some(message) = outgoing else {
                    debug!(subscriber = %id, "subscription closed by hub");
                    break;
                };
                let json = match serde_json::to_string(&message) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize push message: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(subscriber = %id, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => apply_inbound(&state, text.as_str()),
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %id, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }

    state.hub.unsubscribe(id);
}

/// Handle one text frame sent by a push client.
fn apply_inbound(state: &AppState, text: &str) {
    match serde_json::from_str::<PushMessage>(text) {
        Ok(PushMessage::Draw(event)) => {
            state.hub.submit(event, state.clock.now_millis());
        }
        Ok(PushMessage::Init(_)) => {
            warn!("Ignoring INIT frame sent by a client");
        }
        Err(e) => {
            warn!(error = %e, "Ignoring malformed push frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_draw_is_appended() {
        let state = AppState::with_defaults();
        apply_inbound(
            &state,
            r#"{"kind":"DRAW","payload":{"x":4,"y":5,"timestamp":0}}"#,
        );
        assert_eq!(state.hub.len(), 1);
    }

    #[test]
    fn inbound_garbage_leaves_log_untouched() {
        let state = AppState::with_defaults();
        apply_inbound(&state, "not json");
        apply_inbound(&state, r#"{"kind":"INIT","payload":[]}"#);
        assert!(state.hub.is_empty());
    }
}
