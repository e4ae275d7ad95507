//! Real-time service: the one object the transport and producers talk to.

use std::sync::Arc;

use serde_json::Value;

use super::auth::{AuthOutcome, Authenticator, TokenVerifier};
use super::broadcaster::{Broadcaster, NotifyOutcome};
use super::refresher::PeriodicRefresher;
use super::snapshot_provider::SnapshotProvider;
use crate::config::RealtimeConfig;
use crate::domain::admin_event::{AuthAck, PreferencesAck, RoomAck};
use crate::domain::connection_registry::AdminConnection;
use crate::domain::{
    AdminEvent, ConnectionRegistry, ConnectionSession, EventBus, RoomMembership, RoomName,
};
use crate::persistence::QueryGateway;

/// Orchestration layer for connections and producers.
///
/// Owns the per-instance [`ConnectionRegistry`], [`RoomMembership`] and
/// [`EventBus`]. Every connection-facing method takes the caller's
/// [`ConnectionSession`] and returns the events to send back to that
/// connection, in order.
#[derive(Debug, Clone)]
pub struct RealtimeService {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomMembership>,
    bus: EventBus,
    snapshots: SnapshotProvider,
    authenticator: Authenticator,
    broadcaster: Broadcaster,
}

impl RealtimeService {
    /// Builds a service over `gateway`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn QueryGateway>,
        verifier: Arc<dyn TokenVerifier>,
        config: &RealtimeConfig,
    ) -> Self {
        let timeout = config.query_timeout();
        let bus = EventBus::new(config.event_bus_capacity);
        let rooms = Arc::new(RoomMembership::new());
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            snapshots: SnapshotProvider::new(Arc::clone(&gateway), timeout),
            authenticator: Authenticator::new(Arc::clone(&gateway), verifier, timeout),
            broadcaster: Broadcaster::new(gateway, bus.clone(), Arc::clone(&rooms), timeout),
            rooms,
            bus,
        }
    }

    /// Returns the shared event bus.
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Returns the room membership index.
    #[must_use]
    pub const fn rooms(&self) -> &Arc<RoomMembership> {
        &self.rooms
    }

    /// Builds a refresher over this service's snapshots and bus.
    #[must_use]
    pub fn refresher(&self, config: &RealtimeConfig) -> PeriodicRefresher {
        PeriodicRefresher::new(
            self.snapshots.clone(),
            self.bus.clone(),
            config.refresh_interval(),
        )
    }

    /// Opens an anonymous session for a newly accepted connection.
    #[must_use]
    pub fn open_session(&self) -> ConnectionSession {
        let session = ConnectionSession::new();
        tracing::debug!(connection_id = %session.id(), "connection opened");
        session
    }

    /// Runs the handshake for `session`.
    ///
    /// On success the session is registered, joined to the shared admin
    /// channel, and the reply is the acknowledgment followed by the four
    /// snapshot events. An already authenticated session keeps its
    /// identity and gets a fresh acknowledgment without a lookup.
    pub async fn authenticate(
        &self,
        session: &mut ConnectionSession,
        user_id: i64,
        token: &str,
    ) -> Vec<AdminEvent> {
        if let Some(identity) = session.identity() {
            tracing::debug!(
                connection_id = %session.id(),
                user_id = identity.id,
                "handshake repeated on authenticated connection"
            );
            return vec![AdminEvent::Authenticated(AuthAck::accepted(identity.clone()))];
        }

        match self.authenticator.authenticate(user_id, token).await {
            AuthOutcome::Authenticated(identity) => {
                self.registry.register(session.id(), identity.clone()).await;
                session.admit(identity.clone(), self.bus.subscribe());
                tracing::info!(
                    connection_id = %session.id(),
                    user_id = identity.id,
                    name = %identity.full_name,
                    "admin authenticated"
                );

                let mut replies = vec![AdminEvent::Authenticated(AuthAck::accepted(identity))];
                replies.extend(self.snapshots.initial_snapshot().await);
                replies
            }
            AuthOutcome::InvalidCredentials => {
                tracing::warn!(connection_id = %session.id(), user_id, "invalid admin credentials");
                vec![AdminEvent::Authenticated(AuthAck::rejected(
                    AuthAck::INVALID_CREDENTIALS,
                ))]
            }
            AuthOutcome::Failed => vec![AdminEvent::Authenticated(AuthAck::rejected(
                AuthAck::AUTHENTICATION_FAILED,
            ))],
        }
    }

    /// Joins `session` to the `{room_type}-{room_id}` monitoring room.
    pub async fn join_room(
        &self,
        session: &ConnectionSession,
        room_type: &str,
        room_id: &str,
    ) -> AdminEvent {
        let room = RoomName::new(room_type, room_id);
        let changed = self.rooms.join(session.id(), room.clone()).await;
        tracing::debug!(connection_id = %session.id(), %room, changed, "joined room");
        AdminEvent::RoomJoined(RoomAck { room, changed })
    }

    /// Removes `session` from the `{room_type}-{room_id}` monitoring room.
    pub async fn leave_room(
        &self,
        session: &ConnectionSession,
        room_type: &str,
        room_id: &str,
    ) -> AdminEvent {
        let room = RoomName::new(room_type, room_id);
        let changed = self.rooms.leave(session.id(), &room).await;
        tracing::debug!(connection_id = %session.id(), %room, changed, "left room");
        AdminEvent::RoomLeft(RoomAck { room, changed })
    }

    /// Stores dashboard preferences. A no-op for unauthenticated sessions.
    pub async fn set_preferences(
        &self,
        session: &ConnectionSession,
        preferences: Value,
    ) -> AdminEvent {
        let stored = session.is_authenticated()
            && self.registry.set_preferences(session.id(), preferences).await;
        AdminEvent::PreferencesUpdated(PreferencesAck { stored })
    }

    /// Tears down a session on transport disconnect.
    pub async fn close_session(&self, session: ConnectionSession) {
        let id = session.id();
        let authenticated = session.is_authenticated();
        // Release the shared-channel receiver before the registry entry goes.
        drop(session);

        let left = self.rooms.leave_all(id).await;
        if authenticated {
            self.registry.remove(id).await;
        }
        tracing::debug!(
            connection_id = %id,
            authenticated,
            rooms_left = left,
            "connection closed"
        );
    }

    /// See [`Broadcaster::notify_new_order`].
    pub async fn notify_new_order(&self, order_id: i64) -> NotifyOutcome {
        self.broadcaster.notify_new_order(order_id).await
    }

    /// See [`Broadcaster::notify_new_user`].
    pub async fn notify_new_user(&self, user_id: i64) -> NotifyOutcome {
        self.broadcaster.notify_new_user(user_id).await
    }

    /// See [`Broadcaster::notify_new_product`].
    pub async fn notify_new_product(&self, product_id: i64) -> NotifyOutcome {
        self.broadcaster.notify_new_product(product_id).await
    }

    /// See [`Broadcaster::notify_order_status_change`].
    pub async fn notify_order_status_change(
        &self,
        order_id: i64,
        new_status: &str,
    ) -> NotifyOutcome {
        self.broadcaster
            .notify_order_status_change(order_id, new_status)
            .await
    }

    /// See [`Broadcaster::notify_system_alert`].
    pub fn notify_system_alert(&self, payload: Value) -> NotifyOutcome {
        self.broadcaster.notify_system_alert(payload)
    }

    /// See [`Broadcaster::notify_room`].
    pub async fn notify_room(&self, room_type: &str, room_id: &str, payload: Value) -> NotifyOutcome {
        self.broadcaster.notify_room(room_type, room_id, payload).await
    }

    /// Number of authenticated admin connections.
    pub async fn connected_admins_count(&self) -> usize {
        self.registry.len().await
    }

    /// Snapshot of the authenticated admin connections.
    pub async fn connected_admins(&self) -> Vec<AdminConnection> {
        self.registry.list().await
    }
}
