//! Push-notification dispatch handlers.
//!
//! These endpoints are the application-side consumers of the realtime
//! dispatch API: point-to-point delivery to one logical identity, or
//! best-effort broadcast to everyone connected.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{BroadcastRequest, DispatchResponse, SendNotificationRequest};
use crate::app_state::AppState;
use crate::auth::CurrentUser;
use crate::error::{ErrorResponse, GatewayError};
use crate::realtime::Identity;

/// `POST /notifications/send` — Push to one identity's devices.
///
/// # Errors
///
/// Returns [`GatewayError::IdentityNotFound`] when the target has no
/// live connection, or a delivery/serialization failure.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/send",
    tag = "Notifications",
    summary = "Send a push notification",
    description = "Delivers raw text (`message`) or a JSON payload (`payload`) \
                   to every live device of one logical identity. All devices \
                   are attempted; the last failure, if any, is reported.",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Delivered", body = DispatchResponse),
        (status = 400, description = "Neither message nor payload supplied", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "No live connection for the identity", body = ErrorResponse),
    )
)]
pub async fn send(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(req): Json<SendNotificationRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if !caller.is_admin() {
        return Err(GatewayError::Forbidden);
    }

    let identity = Identity::from(req.identity);
    match (req.message, req.payload) {
        (Some(message), None) => state.realtime.send_message(&identity, &message).await?,
        (None, Some(payload)) => state.realtime.send_data(&identity, &payload).await?,
        _ => {
            return Err(GatewayError::InvalidRequest(
                "exactly one of `message` or `payload` is required".to_string(),
            ));
        }
    }

    Ok((
        StatusCode::OK,
        Json(DispatchResponse {
            status: "sent".to_string(),
            identities: state.realtime.identity_count(),
        }),
    ))
}

/// `POST /notifications/broadcast` — Push to every connected identity.
///
/// Delivery is best-effort: per-recipient failures are logged and
/// swallowed so one bad client cannot abort delivery to the rest.
///
/// # Errors
///
/// Returns [`GatewayError::SerializationFailure`] when the payload
/// cannot be encoded; nothing is sent in that case.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/broadcast",
    tag = "Notifications",
    summary = "Broadcast a push notification",
    request_body = BroadcastRequest,
    responses(
        (status = 202, description = "Broadcast dispatched", body = DispatchResponse),
        (status = 400, description = "Neither message nor payload supplied", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn broadcast(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(req): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if !caller.is_admin() {
        return Err(GatewayError::Forbidden);
    }

    match (req.message, req.payload) {
        (Some(message), None) => state.realtime.broadcast_message(&message),
        (None, Some(payload)) => state.realtime.broadcast_data(&payload)?,
        _ => {
            return Err(GatewayError::InvalidRequest(
                "exactly one of `message` or `payload` is required".to_string(),
            ));
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(DispatchResponse {
            status: "broadcast".to_string(),
            identities: state.realtime.identity_count(),
        }),
    ))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications/send", post(send))
        .route("/notifications/broadcast", post(broadcast))
}
