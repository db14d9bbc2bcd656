//! Streaming transport adapter: one-directional server-sent events.
//!
//! Each connected client gets a long-lived `text/event-stream` response
//! fed by its outbound queue. Every frame becomes one `message` event.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream;

use super::hub::RealtimeHub;
use super::identity::{DeviceId, Identity};
use crate::app_state::AppState;
use crate::error::GatewayError;

/// Removes the registry entry when the response stream is dropped.
///
/// Axum drops the stream on client disconnect; the registry's own
/// removal path closes the queue and ends the stream normally. Both
/// paths funnel into the same idempotent disconnect, so concurrent
/// teardown from a failed write and a client disconnect cannot race
/// into a panic or a zombie entry.
struct DisconnectGuard {
    hub: Arc<RealtimeHub>,
    identity: Identity,
    device_id: DeviceId,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if self.hub.disconnect(&self.identity, &self.device_id).is_ok() {
            tracing::info!(
                identity = %self.identity,
                device = %self.device_id,
                "sse stream closed"
            );
        }
    }
}

/// `GET /events` — Open a server-sent-events push stream.
///
/// Anonymous callers are registered under a fresh guest identity;
/// callers with a valid `Bearer` token under their `user-<id>` identity.
/// A malformed header or invalid token is rejected with 401.
///
/// # Errors
///
/// Returns [`GatewayError`] when identity resolution fails.
#[utoipa::path(
    get,
    path = "/events",
    tag = "Realtime",
    summary = "Open an SSE push stream",
    description = "Long-lived `text/event-stream` response. Each pushed message \
                   arrives as one `message` event with the raw text (or JSON \
                   payload) as its data.",
    responses(
        (status = 200, description = "Event stream opened"),
        (status = 401, description = "Malformed or invalid credentials", body = crate::error::ErrorResponse),
    )
)]
pub async fn sse_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    let ticket = state.realtime.connect(&headers)?;
    tracing::info!(
        identity = %ticket.identity,
        device = %ticket.device_id,
        "sse stream opened"
    );

    let guard = DisconnectGuard {
        hub: Arc::clone(&state.realtime),
        identity: ticket.identity,
        device_id: ticket.device_id,
    };

    // The stream owns the queue receiver and the guard: queue close ends
    // it, client disconnect drops it, and either way the guard removes
    // the registry entry.
    let stream = stream::unfold((ticket.outbound, guard), |(mut outbound, guard)| async {
        let text = outbound.recv().await?;
        let event = Event::default().event("message").data(text);
        Some((Ok::<Event, Infallible>(event), (outbound, guard)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
