//! # admin-realtime
//!
//! Authenticated real-time notification service for e-commerce admin
//! dashboards.
//!
//! Dashboards connect over WebSocket, prove an admin identity, receive an
//! initial snapshot of platform metrics, and then get live domain events
//! (new orders, users, products, status changes, alerts) plus periodic
//! aggregate refreshes. Producers trigger broadcasts through the
//! [`service::RealtimeService`] API or the REST notify endpoints.
//!
//! ## Architecture
//!
//! ```text
//! Dashboards (WebSocket)        Producers (HTTP, in-process)
//!     │                               │
//!     ├── WS Handler (ws/)            ├── REST Handlers (api/)
//!     │                               │
//!     └──────────── RealtimeService (service/) ───────────┐
//!                   │            │            │           │
//!             Authenticator  Broadcaster  SnapshotProvider PeriodicRefresher
//!                   │            │            │
//!     ConnectionRegistry, RoomMembership, EventBus (domain/)
//!                   │
//!             QueryGateway (persistence/)
//!                   ├── PostgreSQL
//!                   └── In-memory store
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod server;
pub mod service;
pub mod ws;
