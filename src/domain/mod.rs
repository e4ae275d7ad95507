//! Domain layer: identities, rooms, events, and snapshot types.
//!
//! This module contains the server-side model of the real-time layer:
//! connection identity, the registry of authenticated admins, monitoring
//! room membership, outbound admin events, and the broadcast bus.

pub mod admin_event;
pub mod connection_id;
pub mod connection_registry;
pub mod entities;
pub mod event_bus;
pub mod room;
pub mod session;
pub mod snapshot;

pub use admin_event::AdminEvent;
pub use connection_id::ConnectionId;
pub use connection_registry::ConnectionRegistry;
pub use entities::AdminIdentity;
pub use event_bus::EventBus;
pub use room::{RoomMembership, RoomName};
pub use session::ConnectionSession;
