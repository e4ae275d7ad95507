//! Per-connection session state.

use tokio::sync::broadcast;

use super::ConnectionId;
use super::admin_event::AdminEvent;
use super::entities::AdminIdentity;

/// State owned by one live WebSocket connection.
///
/// The identity and the shared-channel receiver are set together by the
/// handshake and only go away when the session is closed, so "has an
/// identity" and "is a shared-channel member" cannot drift apart.
#[derive(Debug)]
pub struct ConnectionSession {
    id: ConnectionId,
    identity: Option<AdminIdentity>,
    admin_rx: Option<broadcast::Receiver<AdminEvent>>,
}

impl ConnectionSession {
    /// Creates an anonymous session with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ConnectionId::new(),
            identity: None,
            admin_rx: None,
        }
    }

    /// Returns the session's connection id.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the admin identity, if the handshake succeeded.
    #[must_use]
    pub const fn identity(&self) -> Option<&AdminIdentity> {
        self.identity.as_ref()
    }

    /// Returns `true` once the handshake succeeded.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Records the admin identity together with its shared-channel receiver.
    ///
    /// Does nothing if the session is already authenticated.
    pub(crate) fn admit(
        &mut self,
        identity: AdminIdentity,
        admin_rx: broadcast::Receiver<AdminEvent>,
    ) {
        if self.identity.is_none() {
            self.identity = Some(identity);
            self.admin_rx = Some(admin_rx);
        }
    }

    /// Waits for the next shared-channel event.
    ///
    /// Never resolves for an unauthenticated session.
    pub async fn recv_admin_event(&mut self) -> Result<AdminEvent, broadcast::error::RecvError> {
        match self.admin_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }
}

impl Default for ConnectionSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventBus;
    use std::time::Duration;

    fn identity() -> AdminIdentity {
        AdminIdentity {
            id: 1,
            full_name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            role: "admin".to_string(),
            status: "active".to_string(),
        }
    }

    #[tokio::test]
    async fn anonymous_session_never_receives() {
        let bus = EventBus::new(8);
        let mut session = ConnectionSession::new();
        let _other = bus.subscribe();
        bus.publish(AdminEvent::error(1, "x"));

        let waited =
            tokio::time::timeout(Duration::from_millis(20), session.recv_admin_event()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn admitted_session_receives() {
        let bus = EventBus::new(8);
        let mut session = ConnectionSession::new();
        session.admit(identity(), bus.subscribe());
        assert!(session.is_authenticated());

        bus.publish(AdminEvent::error(1, "x"));
        assert!(session.recv_admin_event().await.is_ok());
    }

    #[test]
    fn second_admit_keeps_first_identity() {
        let bus = EventBus::new(8);
        let mut session = ConnectionSession::new();
        session.admit(identity(), bus.subscribe());

        let mut other = identity();
        other.id = 2;
        session.admit(other, bus.subscribe());
        assert_eq!(session.identity().map(|i| i.id), Some(1));
        // The rejected receiver was dropped immediately.
        assert_eq!(bus.receiver_count(), 1);
    }
}
