//! The realtime hub: connection acceptance and the dispatch API.
//!
//! [`RealtimeHub`] is the single dispatch implementation shared by the
//! SSE and WebSocket adapters. Both transports register queue-backed
//! handles in the same [`ConnectionRegistry`]; dispatch code never knows
//! which transport sits behind a handle.

use axum::http::HeaderMap;
use serde::Serialize;
use tokio::sync::mpsc;

use super::identity::{DeviceId, Identity, IdentityResolver};
use super::registry::{ConnectionHandle, ConnectionRegistry};
use crate::error::GatewayError;

/// Everything a transport adapter needs to run one accepted connection.
#[derive(Debug)]
pub struct ConnectionTicket {
    /// Logical identity the connection is registered under.
    pub identity: Identity,
    /// Device key of this connection.
    pub device_id: DeviceId,
    /// Receiving end of the connection's outbound frame queue.
    pub outbound: mpsc::Receiver<String>,
}

/// Connection acceptance and message dispatch for all realtime clients.
///
/// # Delivery contract
///
/// Best-effort, at-most-once: a frame that cannot be delivered to a
/// closed or broken connection is dropped for that recipient. Frames to
/// one device arrive in issuance order (FIFO queue); there is no
/// ordering guarantee across devices or identities.
#[derive(Debug)]
pub struct RealtimeHub {
    resolver: IdentityResolver,
    registry: ConnectionRegistry,
    queue_capacity: usize,
}

impl RealtimeHub {
    /// Creates a hub with per-connection queues of `queue_capacity`.
    ///
    /// Capacity 1 keeps queues effectively unbuffered: a dispatch call
    /// suspends until the connection task drains the previous frame.
    #[must_use]
    pub fn new(resolver: IdentityResolver, queue_capacity: usize) -> Self {
        Self {
            resolver,
            registry: ConnectionRegistry::new(),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Resolves the caller's logical identity from request headers.
    ///
    /// # Errors
    ///
    /// Propagates authenticator failures other than the guest-fallback
    /// "no credentials" case.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Identity, GatewayError> {
        self.resolver.resolve(headers)
    }

    /// Registers a new connection under an already-resolved identity.
    #[must_use]
    pub fn register(&self, identity: Identity) -> ConnectionTicket {
        let device_id = DeviceId::for_identity(&identity);
        let (sender, outbound) = mpsc::channel(self.queue_capacity);
        let handle = ConnectionHandle::new(device_id.clone(), identity.is_guest(), sender);
        self.registry.register(identity.clone(), handle);
        tracing::info!(identity = %identity, device = %device_id, "connection registered");
        ConnectionTicket {
            identity,
            device_id,
            outbound,
        }
    }

    /// Resolves the caller and registers a new connection in one step.
    ///
    /// # Errors
    ///
    /// Same as [`RealtimeHub::resolve`].
    pub fn connect(&self, headers: &HeaderMap) -> Result<ConnectionTicket, GatewayError> {
        let identity = self.resolve(headers)?;
        Ok(self.register(identity))
    }

    /// Sends `message` to every device registered under `identity`.
    ///
    /// All devices are attempted regardless of individual failures; the
    /// last failure, if any, is returned.
    ///
    /// # Errors
    ///
    /// [`GatewayError::IdentityNotFound`] when no bucket exists, or
    /// [`GatewayError::DeliveryFailed`] when at least one device's queue
    /// was already closed.
    pub async fn send_message(
        &self,
        identity: &Identity,
        message: &str,
    ) -> Result<(), GatewayError> {
        let senders = self
            .registry
            .lookup(identity)
            .ok_or_else(|| GatewayError::IdentityNotFound(identity.to_string()))?;

        // Lock released; sends may suspend without blocking the registry.
        let mut last_err = None;
        for sender in senders {
            if sender.send(message.to_string()).await.is_err() {
                tracing::warn!(identity = %identity, "dropped frame for closed connection");
                last_err = Some(GatewayError::DeliveryFailed(identity.to_string()));
            }
        }
        last_err.map_or(Ok(()), Err)
    }

    /// Serializes `payload` as JSON and sends it to every device under
    /// `identity`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::SerializationFailure`] before any send is
    /// attempted, otherwise as [`RealtimeHub::send_message`].
    pub async fn send_data<T: Serialize + ?Sized>(
        &self,
        identity: &Identity,
        payload: &T,
    ) -> Result<(), GatewayError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| GatewayError::SerializationFailure(e.to_string()))?;
        self.send_message(identity, &body).await
    }

    /// Sends `message` to every device of every identity.
    ///
    /// One task is spawned per identity so a slow or stuck recipient can
    /// never stall delivery to the others; failures are logged and
    /// swallowed per the best-effort contract.
    pub fn broadcast_message(&self, message: &str) {
        for (identity, senders) in self.registry.snapshot() {
            let message = message.to_string();
            tokio::spawn(async move {
                for sender in senders {
                    if sender.send(message.clone()).await.is_err() {
                        tracing::warn!(identity = %identity, "dropped broadcast frame");
                    }
                }
            });
        }
    }

    /// Serializes `payload` as JSON and broadcasts it to every identity.
    ///
    /// # Errors
    ///
    /// [`GatewayError::SerializationFailure`]; nothing is sent on failure.
    pub fn broadcast_data<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), GatewayError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| GatewayError::SerializationFailure(e.to_string()))?;
        self.broadcast_message(&body);
        Ok(())
    }

    /// Closes and removes one device's connection.
    ///
    /// # Errors
    ///
    /// [`GatewayError::IdentityNotFound`] / [`GatewayError::DeviceNotFound`]
    /// when the entry is already gone (benign on double-disconnect).
    pub fn disconnect(&self, identity: &Identity, device_id: &DeviceId) -> Result<(), GatewayError> {
        self.registry.remove(identity, device_id)
    }

    /// Number of identities with at least one live connection.
    #[must_use]
    pub fn identity_count(&self) -> usize {
        self.registry.identity_count()
    }

    /// Total number of live connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{JwtAuthenticator, JwtSigner};

    fn hub() -> RealtimeHub {
        let signer = Arc::new(JwtSigner::new("test-secret", "pulse-gateway", 3600));
        let resolver = IdentityResolver::new(Arc::new(JwtAuthenticator::new(signer)));
        RealtimeHub::new(resolver, 1)
    }

    #[tokio::test]
    async fn send_to_unknown_identity_is_not_found() {
        let hub = hub();
        let result = hub.send_message(&Identity::from("nonexistent"), "hi").await;
        assert!(matches!(result, Err(GatewayError::IdentityNotFound(_))));
    }

    #[tokio::test]
    async fn guest_scenario_delivers_to_its_own_channel() {
        let hub = hub();
        let mut ticket = hub.register(Identity::guest());
        assert_eq!(ticket.device_id.as_str(), ticket.identity.as_str());

        let identity = ticket.identity.clone();
        let send = hub.send_message(&identity, "hi");
        let (sent, received) = tokio::join!(send, ticket.outbound.recv());
        assert!(sent.is_ok());
        assert_eq!(received.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn fan_out_reaches_every_device() {
        let hub = hub();
        let identity = Identity::user(1);
        let mut ticket_a = hub.register(identity.clone());
        let mut ticket_b = hub.register(identity.clone());
        assert_eq!(hub.connection_count(), 2);

        let send = hub.send_message(&identity, "x");
        let (sent, a, b) = tokio::join!(send, ticket_a.outbound.recv(), ticket_b.outbound.recv());
        assert!(sent.is_ok());
        assert_eq!(a.as_deref(), Some("x"));
        assert_eq!(b.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn send_data_preserves_field_order() {
        #[derive(Serialize)]
        struct Payload {
            name: String,
            age: u8,
        }

        let hub = hub();
        let mut ticket = hub.register(Identity::user(2));
        let identity = ticket.identity.clone();

        let payload = Payload {
            name: "a".to_string(),
            age: 1,
        };
        let send = hub.send_data(&identity, &payload);
        let (sent, received) = tokio::join!(send, ticket.outbound.recv());
        assert!(sent.is_ok());
        assert_eq!(received.as_deref(), Some(r#"{"name":"a","age":1}"#));
    }

    #[tokio::test]
    async fn send_reports_failure_but_attempts_all_devices() {
        let hub = hub();
        let identity = Identity::user(3);
        let ticket_closed = hub.register(identity.clone());
        let mut ticket_open = hub.register(identity.clone());
        drop(ticket_closed.outbound);

        let send = hub.send_message(&identity, "still here");
        let (sent, received) = tokio::join!(send, ticket_open.outbound.recv());
        assert!(matches!(sent, Err(GatewayError::DeliveryFailed(_))));
        assert_eq!(received.as_deref(), Some("still here"));
    }

    #[tokio::test]
    async fn broadcast_reaches_all_identities() {
        let hub = hub();
        let mut tickets = vec![
            hub.register(Identity::user(10)),
            hub.register(Identity::user(11)),
        ];

        hub.broadcast_message("x");
        for ticket in &mut tickets {
            assert_eq!(ticket.outbound.recv().await.as_deref(), Some("x"));
        }
    }

    #[tokio::test]
    async fn broadcast_isolation_survives_a_closed_recipient() {
        let hub = hub();
        let closed = hub.register(Identity::user(20));
        let mut open_a = hub.register(Identity::user(21));
        let mut open_b = hub.register(Identity::user(22));
        drop(closed.outbound);

        hub.broadcast_message("to the living");
        assert_eq!(open_a.outbound.recv().await.as_deref(), Some("to the living"));
        assert_eq!(open_b.outbound.recv().await.as_deref(), Some("to the living"));
    }

    #[tokio::test]
    async fn broadcast_data_rejects_unserializable_payloads() {
        let hub = hub();
        // JSON object keys must be strings; a tuple key cannot serialize.
        let bad = std::collections::HashMap::from([((1u8, 2u8), "value")]);
        assert!(matches!(
            hub.broadcast_data(&bad),
            Err(GatewayError::SerializationFailure(_))
        ));
    }

    #[tokio::test]
    async fn disconnect_removes_the_registration() {
        let hub = hub();
        let ticket = hub.register(Identity::user(30));
        assert!(hub.disconnect(&ticket.identity, &ticket.device_id).is_ok());
        assert_eq!(hub.connection_count(), 0);

        let result = hub.send_message(&ticket.identity, "gone").await;
        assert!(matches!(result, Err(GatewayError::IdentityNotFound(_))));

        // Second disconnect is benign.
        assert!(hub.disconnect(&ticket.identity, &ticket.device_id).is_err());
    }

    #[tokio::test]
    async fn connect_registers_a_guest_from_empty_headers() {
        let hub = hub();
        let Ok(ticket) = hub.connect(&HeaderMap::new()) else {
            panic!("guest connect failed");
        };
        assert!(ticket.identity.is_guest());
        assert!(hub.connection_count() == 1);
    }
}
