//! Service layer: handshake, snapshots, broadcasting, periodic refresh.
//!
//! [`RealtimeService`] is the entry point used by the WebSocket transport
//! and by the producer-facing REST handlers. It delegates to the
//! [`auth::Authenticator`], [`snapshot_provider::SnapshotProvider`] and
//! [`broadcaster::Broadcaster`], and hands out a
//! [`refresher::PeriodicRefresher`] for the background timer.

pub mod auth;
pub mod broadcaster;
pub mod realtime_service;
pub mod refresher;
pub mod snapshot_provider;

pub use auth::{IdentityOnlyVerifier, NonEmptyTokenVerifier, TokenVerifier};
pub use broadcaster::NotifyOutcome;
pub use realtime_service::RealtimeService;
pub use refresher::{PeriodicRefresher, RefresherHandle};
pub use snapshot_provider::SnapshotProvider;
