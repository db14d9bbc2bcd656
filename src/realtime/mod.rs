//! Realtime layer: connection registry, identity resolution, and the
//! SSE/WebSocket push transports.
//!
//! Control flow: an inbound request is resolved to a logical identity
//! (authenticated `user-<id>` or minted `guest-<token>`), registered in
//! the [`registry::ConnectionRegistry`] under a per-connection device
//! key, and then served by one of two transport adapters over the same
//! queue-backed handle. Application code pushes messages through the
//! [`hub::RealtimeHub`] dispatch API; delivery is best-effort with safe
//! teardown under concurrent send/disconnect races.

pub mod hub;
pub mod identity;
pub mod registry;
pub mod sse;
pub mod websocket;

pub use hub::{ConnectionTicket, RealtimeHub};
pub use identity::{DeviceId, Identity, IdentityResolver};
pub use registry::{ConnectionHandle, ConnectionRegistry};

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Realtime routes mounted at the root level: `/events` and `/ws`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(sse::sse_handler))
        .route("/ws", get(websocket::ws_handler))
}
