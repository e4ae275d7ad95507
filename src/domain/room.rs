//! Monitoring rooms and per-connection membership.
//!
//! A room exists only through its members: [`RoomMembership`] keeps an
//! explicit map from room name to connection ids plus the reverse index,
//! and prunes entries as soon as they become empty.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::ConnectionId;

/// Name of a monitoring room, `{entityType}-{entityId}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Builds the room name for an entity type and id.
    #[must_use]
    pub fn new(room_type: &str, room_id: &str) -> Self {
        Self(format!("{room_type}-{room_id}"))
    }

    /// Returns the room name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default)]
struct RoomIndex {
    members: HashMap<RoomName, HashSet<ConnectionId>>,
    joined: HashMap<ConnectionId, HashSet<RoomName>>,
}

/// Room membership for every live connection.
///
/// Joining is idempotent, leaving a room that was never joined is a no-op,
/// and no cap is placed on the number of rooms per connection.
#[derive(Debug, Default)]
pub struct RoomMembership {
    index: RwLock<RoomIndex>,
}

impl RoomMembership {
    /// Creates an empty membership index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `connection` to `room`. Returns `true` if it was not already a member.
    pub async fn join(&self, connection: ConnectionId, room: RoomName) -> bool {
        let mut index = self.index.write().await;
        let added = index
            .members
            .entry(room.clone())
            .or_default()
            .insert(connection);
        index.joined.entry(connection).or_default().insert(room);
        added
    }

    /// Removes `connection` from `room`. Returns `true` if it was a member.
    pub async fn leave(&self, connection: ConnectionId, room: &RoomName) -> bool {
        let mut index = self.index.write().await;
        let removed = remove_member(&mut index.members, room, connection);
        if let Some(rooms) = index.joined.get_mut(&connection) {
            rooms.remove(room);
            if rooms.is_empty() {
                index.joined.remove(&connection);
            }
        }
        removed
    }

    /// Removes `connection` from every room it joined. Returns the number
    /// of rooms left.
    pub async fn leave_all(&self, connection: ConnectionId) -> usize {
        let mut index = self.index.write().await;
        let Some(rooms) = index.joined.remove(&connection) else {
            return 0;
        };
        for room in &rooms {
            remove_member(&mut index.members, room, connection);
        }
        rooms.len()
    }

    /// Returns `true` if `connection` is a member of `room`.
    pub async fn is_member(&self, connection: ConnectionId, room: &RoomName) -> bool {
        self.index
            .read()
            .await
            .members
            .get(room)
            .is_some_and(|members| members.contains(&connection))
    }

    /// Returns the current members of `room`.
    pub async fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.index
            .read()
            .await
            .members
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the rooms `connection` has joined, sorted by name.
    #[cfg(test)]
    pub(crate) async fn rooms_of(&self, connection: ConnectionId) -> Vec<RoomName> {
        let mut rooms: Vec<RoomName> = self
            .index
            .read()
            .await
            .joined
            .get(&connection)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Returns the number of non-empty rooms.
    pub async fn room_count(&self) -> usize {
        self.index.read().await.members.len()
    }
}

/// Removes one member and prunes the room when it empties.
fn remove_member(
    members: &mut HashMap<RoomName, HashSet<ConnectionId>>,
    room: &RoomName,
    connection: ConnectionId,
) -> bool {
    let Some(set) = members.get_mut(room) else {
        return false;
    };
    let removed = set.remove(&connection);
    if set.is_empty() {
        members.remove(room);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_name_joins_type_and_id() {
        assert_eq!(RoomName::new("order", "42").as_str(), "order-42");
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let rooms = RoomMembership::new();
        let conn = ConnectionId::new();
        let room = RoomName::new("order", "42");

        assert!(rooms.join(conn, room.clone()).await);
        assert!(!rooms.join(conn, room.clone()).await);
        assert_eq!(rooms.members(&room).await.len(), 1);

        // A single leave removes the membership fully.
        assert!(rooms.leave(conn, &room).await);
        assert!(!rooms.is_member(conn, &room).await);
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn leaving_unjoined_room_is_noop() {
        let rooms = RoomMembership::new();
        let conn = ConnectionId::new();
        assert!(!rooms.leave(conn, &RoomName::new("user", "1")).await);
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn empty_rooms_are_pruned() {
        let rooms = RoomMembership::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let room = RoomName::new("product", "5");

        rooms.join(a, room.clone()).await;
        rooms.join(b, room.clone()).await;
        rooms.leave(a, &room).await;
        assert_eq!(rooms.room_count().await, 1);
        assert!(rooms.is_member(b, &room).await);

        rooms.leave(b, &room).await;
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn leave_all_only_affects_one_connection() {
        let rooms = RoomMembership::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let shared = RoomName::new("order", "1");

        rooms.join(a, shared.clone()).await;
        rooms.join(a, RoomName::new("order", "2")).await;
        rooms.join(b, shared.clone()).await;

        assert_eq!(rooms.leave_all(a).await, 2);
        assert!(rooms.rooms_of(a).await.is_empty());
        assert_eq!(rooms.members(&shared).await, vec![b]);
        assert_eq!(rooms.room_count().await, 1);
    }

    #[tokio::test]
    async fn rooms_of_is_sorted() {
        let rooms = RoomMembership::new();
        let conn = ConnectionId::new();
        rooms.join(conn, RoomName::new("user", "9")).await;
        rooms.join(conn, RoomName::new("order", "3")).await;

        let names: Vec<String> = rooms
            .rooms_of(conn)
            .await
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, ["order-3", "user-9"]);
    }
}
