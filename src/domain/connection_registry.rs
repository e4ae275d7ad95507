//! Registry of authenticated admin connections.
//!
//! [`ConnectionRegistry`] maps each authenticated [`ConnectionId`] to the
//! admin identity it proved during the handshake. One registry is owned
//! by each service instance; nothing about it is process-global.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::ConnectionId;
use super::entities::AdminIdentity;

/// Registry entry for one authenticated connection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminConnection {
    /// Transport session identifier.
    #[schema(value_type = String, format = Uuid)]
    pub connection_id: ConnectionId,
    /// Identity proven at handshake time.
    pub user: AdminIdentity,
    /// Dashboard preferences sent by the client, if any.
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<Value>,
    /// When the handshake completed.
    pub authenticated_at: DateTime<Utc>,
}

/// Central store of authenticated admin connections.
///
/// # Concurrency
///
/// All mutation happens behind a single `RwLock`; introspection readers
/// run concurrently with each other.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, AdminConnection>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `connection_id` as an authenticated admin.
    ///
    /// A second registration for the same connection overwrites the first
    /// and returns the previous entry.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        user: AdminIdentity,
    ) -> Option<AdminConnection> {
        let entry = AdminConnection {
            connection_id,
            user,
            preferences: None,
            authenticated_at: Utc::now(),
        };
        self.connections.write().await.insert(connection_id, entry)
    }

    /// Removes the entry for `connection_id`, returning it if present.
    pub async fn remove(&self, connection_id: ConnectionId) -> Option<AdminConnection> {
        self.connections.write().await.remove(&connection_id)
    }

    #[cfg(test)]
    pub(crate) async fn get(&self, connection_id: ConnectionId) -> Option<AdminConnection> {
        self.connections.read().await.get(&connection_id).cloned()
    }

    /// Stores dashboard preferences for a registered connection.
    ///
    /// Returns `false` (and stores nothing) if the connection is not registered.
    pub async fn set_preferences(&self, connection_id: ConnectionId, preferences: Value) -> bool {
        let mut map = self.connections.write().await;
        match map.get_mut(&connection_id) {
            Some(entry) => {
                entry.preferences = Some(preferences);
                true
            }
            None => false,
        }
    }

    /// Returns all registered connections, oldest handshake first.
    pub async fn list(&self) -> Vec<AdminConnection> {
        let mut entries: Vec<AdminConnection> =
            self.connections.read().await.values().cloned().collect();
        entries.sort_by_key(|e| e.authenticated_at);
        entries
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no admin is connected.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn admin(id: i64, name: &str) -> AdminIdentity {
        AdminIdentity {
            id,
            full_name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            role: "admin".to_string(),
            status: "active".to_string(),
        }
    }

    #[tokio::test]
    async fn register_and_get() {
        let registry = ConnectionRegistry::new();
        let conn = ConnectionId::new();

        assert!(registry.register(conn, admin(7, "Ada")).await.is_none());
        let Some(entry) = registry.get(conn).await else {
            panic!("entry should exist");
        };
        assert_eq!(entry.user.id, 7);
        assert!(entry.preferences.is_none());
    }

    #[tokio::test]
    async fn re_register_overwrites() {
        let registry = ConnectionRegistry::new();
        let conn = ConnectionId::new();

        registry.register(conn, admin(7, "Ada")).await;
        let previous = registry.register(conn, admin(7, "Ada")).await;
        assert!(previous.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn remove_only_affects_one_entry() {
        let registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.register(a, admin(1, "Ada")).await;
        registry.register(b, admin(2, "Grace")).await;

        assert!(registry.remove(a).await.is_some());
        let remaining = registry.list().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.first().map(|e| e.connection_id), Some(b));
    }

    #[tokio::test]
    async fn remove_unknown_is_noop() {
        let registry = ConnectionRegistry::new();
        assert!(registry.remove(ConnectionId::new()).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn preferences_require_registration() {
        let registry = ConnectionRegistry::new();
        let conn = ConnectionId::new();
        let prefs = serde_json::json!({"theme": "dark"});

        assert!(!registry.set_preferences(conn, prefs.clone()).await);

        registry.register(conn, admin(1, "Ada")).await;
        assert!(registry.set_preferences(conn, prefs.clone()).await);
        let stored = registry.get(conn).await.and_then(|e| e.preferences);
        assert_eq!(stored, Some(prefs));
    }
}
