//! WebSocket layer: connection handling and message decoding.
//!
//! The endpoint at `/ws` carries the dashboard protocol: JSON text frames
//! `{"event": <name>, "data": <payload>}` in both directions.

pub mod connection;
pub mod handler;
pub mod messages;
