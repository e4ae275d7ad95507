//! Broadcast channels for admin events.
//!
//! [`EventBus`] wraps two [`tokio::sync::broadcast`] channels:
//!
//! - the shared admin channel, which only authenticated connections
//!   subscribe to (a receiver is created in the same step that registers
//!   the connection, and dropped with it);
//! - the room channel, which a connection subscribes to once it joins its
//!   first room and filters locally against its room memberships. It only
//!   carries [`RoomEventPayload`]s, never shared-channel event kinds, since
//!   room membership needs no authentication.

use tokio::sync::broadcast;

use super::admin_event::{AdminEvent, RoomEventPayload};

/// Broadcast bus for [`AdminEvent`]s.
///
/// When a ring buffer is full, the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    admins: broadcast::Sender<AdminEvent>,
    rooms: broadcast::Sender<RoomEventPayload>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given per-channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (admins, _) = broadcast::channel(capacity);
        let (rooms, _) = broadcast::channel(capacity);
        Self { admins, rooms }
    }

    /// Publishes an event to every member of the shared admin channel.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: AdminEvent) -> usize {
        self.admins.send(event).unwrap_or(0)
    }

    /// Publishes a `room-event` addressed to `event.room`.
    ///
    /// Returns the number of connection loops that will inspect it; each
    /// loop forwards it only if its connection is a member of the room.
    pub fn publish_to_room(&self, event: RoomEventPayload) -> usize {
        self.rooms.send(event).unwrap_or(0)
    }

    /// Joins the shared admin channel.
    ///
    /// Only the handshake should call this, once per authenticated connection.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AdminEvent> {
        self.admins.subscribe()
    }

    /// Subscribes to room-scoped events.
    #[must_use]
    pub fn subscribe_rooms(&self) -> broadcast::Receiver<RoomEventPayload> {
        self.rooms.subscribe()
    }

    /// Returns the current number of shared admin channel members.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.admins.receiver_count()
    }

    #[cfg(test)]
    pub(crate) fn room_receiver_count(&self) -> usize {
        self.rooms.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::RoomName;
    use crate::domain::admin_event::CountPayload;
    use chrono::Utc;

    fn make_event(count: i64) -> AdminEvent {
        AdminEvent::ActiveOrdersUpdate(CountPayload { count })
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(100);
        assert_eq!(bus.publish(make_event(1)), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_in_publish_order() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(make_event(1)), 2);
        bus.publish(make_event(2));

        for rx in [&mut rx1, &mut rx2] {
            let (Ok(first), Ok(second)) = (rx.recv().await, rx.recv().await) else {
                panic!("expected two events");
            };
            assert_eq!(first, make_event(1));
            assert_eq!(second, make_event(2));
        }
    }

    #[tokio::test]
    async fn room_channel_is_separate() {
        let bus = EventBus::new(100);
        let mut admin_rx = bus.subscribe();
        let mut room_rx = bus.subscribe_rooms();

        let room = RoomName::new("order", "42");
        let event = RoomEventPayload {
            room: room.clone(),
            payload: serde_json::json!({"note": "packed"}),
            timestamp: Utc::now(),
        };
        assert_eq!(bus.publish_to_room(event), 1);

        let Ok(received) = room_rx.recv().await else {
            panic!("expected room event");
        };
        assert_eq!(received.room, room);
        assert!(admin_rx.try_recv().is_err());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(100);
        assert_eq!(bus.receiver_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        let _rooms = bus.subscribe_rooms();
        assert_eq!(bus.receiver_count(), 2);

        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}
