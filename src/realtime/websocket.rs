//! Socket transport adapter: bidirectional framed connections.
//!
//! The upgrade handler resolves the caller's identity from the HTTP
//! headers before upgrading, so auth failures stay ordinary error
//! responses. After the upgrade, [`run_connection`] pumps inbound frames
//! into a caller-supplied callback and drains the outbound queue onto
//! the socket.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use super::hub::{ConnectionTicket, RealtimeHub};
use super::identity::Identity;
use crate::app_state::AppState;
use crate::error::GatewayError;

/// `GET /ws` — Upgrade to a WebSocket push connection.
///
/// # Errors
///
/// Returns [`GatewayError`] when identity resolution fails; the upgrade
/// is never attempted for unauthenticatable callers.
#[utoipa::path(
    get,
    path = "/ws",
    tag = "Realtime",
    summary = "Open a WebSocket push connection",
    description = "Bidirectional connection sharing registration and dispatch \
                   semantics with the SSE stream. Inbound text frames are \
                   handed to the server-side message callback.",
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 401, description = "Malformed or invalid credentials", body = crate::error::ErrorResponse),
    )
)]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    let identity = state.realtime.resolve(&headers)?;
    let hub = Arc::clone(&state.realtime);

    // Register only once the handshake completes, so a client that never
    // finishes the upgrade leaves no registry entry behind.
    Ok(ws.on_upgrade(move |socket| async move {
        let ticket = hub.register(identity);
        run_connection(socket, hub, ticket, |identity, text| {
            tracing::debug!(identity = %identity, len = text.len(), "inbound ws frame");
            Ok(())
        })
        .await;
    }))
}

/// Runs the read/write loop for one registered WebSocket connection.
///
/// - Inbound text and binary frames are passed to `on_message`; a
///   callback error, a `Close` frame, or a read error exits the loop.
/// - Outbound queue items are written to the socket; a closed queue
///   (registry removal) sends a final `Close` frame and exits.
///
/// All outbound writes go through this loop's half of the split socket,
/// so writes to one physical connection are never interleaved. On exit
/// the registry entry is removed; teardown racing an explicit
/// disconnect is benign.
pub async fn run_connection<F>(
    socket: WebSocket,
    hub: Arc<RealtimeHub>,
    ticket: ConnectionTicket,
    on_message: F,
) where
    F: Fn(&Identity, &str) -> Result<(), GatewayError> + Send,
{
    let ConnectionTicket {
        identity,
        device_id,
        mut outbound,
    } = ticket;
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(err) = on_message(&identity, text.as_str()) {
                            tracing::warn!(identity = %identity, error = %err, "message callback failed");
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let text = String::from_utf8_lossy(&data);
                        if let Err(err) = on_message(&identity, &text) {
                            tracing::warn!(identity = %identity, error = %err, "message callback failed");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::debug!(identity = %identity, error = %err, "ws read error");
                        break;
                    }
                }
            }
            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        if ws_tx.send(Message::text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Queue closed by registry removal: say goodbye.
                    None => {
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    if hub.disconnect(&identity, &device_id).is_ok() {
        tracing::info!(identity = %identity, device = %device_id, "ws connection closed");
    }
}
