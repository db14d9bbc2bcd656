//! DTOs for the push-notification dispatch endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/v1/notifications/send`.
///
/// Exactly one of `message` (raw text) or `payload` (JSON, serialized
/// before transmission) must be present.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendNotificationRequest {
    /// Target logical identity, e.g. `user-42` or `guest-AbCdEfGh`.
    pub identity: String,
    /// Raw text to deliver.
    #[serde(default)]
    pub message: Option<String>,
    /// Structured payload to deliver as JSON.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Request body for `POST /api/v1/notifications/broadcast`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Raw text to deliver.
    #[serde(default)]
    pub message: Option<String>,
    /// Structured payload to deliver as JSON.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Response body for dispatch endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchResponse {
    /// `"sent"` for point-to-point, `"broadcast"` for fan-out to all.
    pub status: String,
    /// Number of identities with live connections at dispatch time.
    pub identities: usize,
}
