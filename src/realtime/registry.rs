//! Concurrent connection storage keyed by identity and device.
//!
//! [`ConnectionRegistry`] maps each [`Identity`] to its set of live
//! [`ConnectionHandle`]s under one coarse `RwLock`. Critical sections are
//! short and contain no I/O or `.await`; the actual message writes happen
//! outside the lock on sender clones obtained from a lookup snapshot.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;

use super::identity::{DeviceId, Identity};
use crate::error::GatewayError;

/// One live connection's registry entry.
///
/// The `sender` feeds the connection task's outbound queue; that task is
/// the only writer to the underlying transport, so all writes to one
/// physical connection are serialized by construction.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Device key, unique within the identity's bucket.
    pub device_id: DeviceId,
    /// Whether this connection belongs to a guest identity.
    pub is_guest: bool,
    /// Capability strings (currently presence-only).
    pub permissions: Vec<String>,
    sender: mpsc::Sender<String>,
}

impl ConnectionHandle {
    /// Creates a handle wrapping the connection's outbound queue.
    #[must_use]
    pub fn new(device_id: DeviceId, is_guest: bool, sender: mpsc::Sender<String>) -> Self {
        Self {
            device_id,
            is_guest,
            permissions: Vec::new(),
            sender,
        }
    }

    /// Clones the outbound sender for use outside the registry lock.
    #[must_use]
    pub fn sender(&self) -> mpsc::Sender<String> {
        self.sender.clone()
    }
}

type Bucket = HashMap<DeviceId, ConnectionHandle>;

/// Concurrent-safe mapping `Identity -> DeviceId -> ConnectionHandle`.
///
/// # Concurrency
///
/// A single registry-wide lock guards all operations; there is no
/// per-key locking. An entry present in the map is always backed by a
/// live, not-yet-closed queue: [`ConnectionRegistry::remove`] drops the
/// registry's sender (the close signal) and deletes the entry in the
/// same critical section, so no other task can observe a zombie entry.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<HashMap<Identity, Bucket>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Identity, Bucket>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Identity, Bucket>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `handle` under `identity`, creating the bucket if absent.
    pub fn register(&self, identity: Identity, handle: ConnectionHandle) {
        let mut map = self.write();
        map.entry(identity)
            .or_default()
            .insert(handle.device_id.clone(), handle);
    }

    /// Returns cloned senders for every device under `identity`.
    ///
    /// The clones are a snapshot: callers never hold a reference into the
    /// map past the lock scope, and sends on the clones happen entirely
    /// outside the registry lock.
    #[must_use]
    pub fn lookup(&self, identity: &Identity) -> Option<Vec<mpsc::Sender<String>>> {
        let map = self.read();
        map.get(identity)
            .map(|bucket| bucket.values().map(ConnectionHandle::sender).collect())
    }

    /// Snapshot of every identity with its device senders, for broadcast.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Identity, Vec<mpsc::Sender<String>>)> {
        let map = self.read();
        map.iter()
            .map(|(identity, bucket)| {
                (
                    identity.clone(),
                    bucket.values().map(ConnectionHandle::sender).collect(),
                )
            })
            .collect()
    }

    /// Closes and removes one device's connection.
    ///
    /// Dropping the stored handle drops the registry's sender, which is
    /// the close signal for the connection task once every in-flight
    /// sender clone is gone. An emptied bucket is pruned. Calling this
    /// twice for the same device is benign: the second call reports
    /// not-found and never panics.
    ///
    /// # Errors
    ///
    /// [`GatewayError::IdentityNotFound`] if the identity has no bucket,
    /// [`GatewayError::DeviceNotFound`] if the bucket lacks the device.
    pub fn remove(&self, identity: &Identity, device_id: &DeviceId) -> Result<(), GatewayError> {
        let mut map = self.write();
        let bucket = map
            .get_mut(identity)
            .ok_or_else(|| GatewayError::IdentityNotFound(identity.to_string()))?;
        bucket
            .remove(device_id)
            .ok_or_else(|| GatewayError::DeviceNotFound(device_id.to_string()))?;
        if bucket.is_empty() {
            map.remove(identity);
        }
        Ok(())
    }

    /// Returns `true` if the identity has at least one live connection.
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.read().contains_key(identity)
    }

    /// Number of devices registered under `identity`.
    #[must_use]
    pub fn device_count(&self, identity: &Identity) -> usize {
        self.read().get(identity).map_or(0, Bucket::len)
    }

    /// Number of identities with at least one live connection.
    #[must_use]
    pub fn identity_count(&self) -> usize {
        self.read().len()
    }

    /// Total number of live connections across all identities.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.read().values().map(Bucket::len).sum()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn handle_for(identity: &Identity) -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(1);
        let device_id = DeviceId::for_identity(identity);
        (ConnectionHandle::new(device_id, identity.is_guest(), tx), rx)
    }

    #[test]
    fn register_then_lookup_finds_the_device() {
        let registry = ConnectionRegistry::new();
        let identity = Identity::user(1);
        let (handle, _rx) = handle_for(&identity);

        registry.register(identity.clone(), handle);

        let Some(senders) = registry.lookup(&identity) else {
            panic!("expected a bucket");
        };
        assert_eq!(senders.len(), 1);
        assert_eq!(registry.device_count(&identity), 1);
    }

    #[test]
    fn lookup_unknown_identity_is_none() {
        let registry = ConnectionRegistry::new();
        assert!(registry.lookup(&Identity::user(9)).is_none());
    }

    #[test]
    fn multiple_devices_share_one_bucket() {
        let registry = ConnectionRegistry::new();
        let identity = Identity::user(2);
        let (a, _rx_a) = handle_for(&identity);
        let (b, _rx_b) = handle_for(&identity);

        registry.register(identity.clone(), a);
        registry.register(identity.clone(), b);

        assert_eq!(registry.device_count(&identity), 2);
        assert_eq!(registry.identity_count(), 1);
        assert_eq!(registry.connection_count(), 2);
    }

    #[test]
    fn remove_closes_the_queue_and_prunes_the_bucket() {
        let registry = ConnectionRegistry::new();
        let identity = Identity::user(3);
        let (handle, mut rx) = handle_for(&identity);
        let device_id = handle.device_id.clone();

        registry.register(identity.clone(), handle);
        assert!(registry.remove(&identity, &device_id).is_ok());

        // Registry sender dropped: the connection task sees a closed queue.
        assert!(rx.try_recv().is_err());
        assert!(!registry.contains(&identity));
        assert!(registry.lookup(&identity).is_none());
    }

    #[test]
    fn double_remove_is_benign() {
        let registry = ConnectionRegistry::new();
        let identity = Identity::user(4);
        let (handle, _rx) = handle_for(&identity);
        let device_id = handle.device_id.clone();

        registry.register(identity.clone(), handle);
        assert!(registry.remove(&identity, &device_id).is_ok());
        assert!(matches!(
            registry.remove(&identity, &device_id),
            Err(GatewayError::IdentityNotFound(_))
        ));
    }

    #[test]
    fn remove_unknown_device_keeps_siblings() {
        let registry = ConnectionRegistry::new();
        let identity = Identity::user(5);
        let (handle, _rx) = handle_for(&identity);

        registry.register(identity.clone(), handle);
        let bogus = DeviceId::from("user-5-nope");
        assert!(matches!(
            registry.remove(&identity, &bogus),
            Err(GatewayError::DeviceNotFound(_))
        ));
        assert_eq!(registry.device_count(&identity), 1);
    }

    #[tokio::test]
    async fn concurrent_register_and_remove() {
        let registry = std::sync::Arc::new(ConnectionRegistry::new());
        let mut tasks = Vec::new();
        for id in 0..16 {
            let registry = std::sync::Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let identity = Identity::user(id);
                let (tx, _rx) = mpsc::channel(1);
                let device_id = DeviceId::for_identity(&identity);
                let handle = ConnectionHandle::new(device_id.clone(), false, tx);
                registry.register(identity.clone(), handle);
                registry.remove(&identity, &device_id)
            }));
        }
        for task in tasks {
            let Ok(result) = task.await else {
                panic!("task panicked");
            };
            assert!(result.is_ok());
        }
        assert_eq!(registry.identity_count(), 0);
    }
}
