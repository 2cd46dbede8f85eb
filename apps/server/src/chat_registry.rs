//! Live chat connections, keyed by user id.
//!
//! Each open chat event stream registers a bounded channel here. Sending to
//! a user fans the event out to every stream that user has open; full or
//! closed channels are skipped and closed ones are pruned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::events::ServerEvent;

const CONNECTION_BUFFER: usize = 64;

pub type ConnectionId = u64;

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, Vec<(ConnectionId, mpsc::Sender<ServerEvent>)>>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a connection for `user_id` and returns its receiving end.
    pub fn add(&self, user_id: &str) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        connections
            .entry(user_id.to_string())
            .or_default()
            .push((id, tx));
        tracing::debug!("Chat connection {} opened for user {}", id, user_id);
        (id, rx)
    }

    pub fn remove(&self, user_id: &str, connection_id: ConnectionId) {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(list) = connections.get_mut(user_id) {
            list.retain(|(id, _)| *id != connection_id);
            if list.is_empty() {
                connections.remove(user_id);
            }
        }
        tracing::debug!("Chat connection {} closed for user {}", connection_id, user_id);
    }

    /// Delivers `event` to every open connection of `user_id`. Returns the
    /// number of connections that accepted it.
    pub fn broadcast(&self, user_id: &str, event: ServerEvent) -> usize {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(list) = connections.get_mut(user_id) else {
            return 0;
        };

        let mut delivered = 0;
        list.retain(|(id, tx)| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Chat connection {} is lagging, event dropped", id);
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        if list.is_empty() {
            connections.remove(user_id);
        }
        delivered
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .map(Vec::len)
            .sum()
    }
}

/// Removes its connection from the registry when dropped, i.e. when the
/// client's event stream goes away.
pub struct ConnectionGuard {
    registry: Arc<ConnectionRegistry>,
    user_id: String,
    connection_id: ConnectionId,
}

impl ConnectionGuard {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        user_id: String,
        connection_id: ConnectionId,
    ) -> Self {
        Self {
            registry,
            user_id,
            connection_id,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.user_id, self.connection_id);
    }
}
