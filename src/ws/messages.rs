//! Client → server WebSocket messages.
//!
//! Frames are JSON objects `{"event": "<name>", "data": {...}}`. Outbound
//! frames use the same shape; see [`crate::domain::AdminEvent`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::RealtimeError;

/// Commands a dashboard can send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Prove an admin identity.
    Authenticate(AuthenticateRequest),
    /// Join a monitoring room.
    JoinRoom(RoomRequest),
    /// Leave a monitoring room.
    LeaveRoom(RoomRequest),
    /// Store dashboard preferences.
    SetPreferences(PreferencesRequest),
}

/// `authenticate` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticateRequest {
    /// Claimed user id; accepts a JSON number or numeric string.
    #[serde(rename = "userId", deserialize_with = "i64_from_string_or_number")]
    pub user_id: i64,
    /// Session token presented with the id.
    #[serde(default)]
    pub token: String,
}

/// `join-room` / `leave-room` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomRequest {
    /// Entity type, e.g. `order`.
    #[serde(rename = "type")]
    pub room_type: String,
    /// Entity id; accepts a JSON number or string.
    #[serde(deserialize_with = "string_from_string_or_number")]
    pub id: String,
}

/// `set-preferences` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreferencesRequest {
    /// Arbitrary preference blob.
    pub preferences: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(i64),
    String(String),
}

fn i64_from_string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    match StringOrNumber::deserialize(de)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid numeric id: {s}"))),
    }
}

fn string_from_string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match StringOrNumber::deserialize(de)? {
        StringOrNumber::Number(n) => Ok(n.to_string()),
        StringOrNumber::String(s) => Ok(s),
    }
}

#[derive(Deserialize)]
struct FrameHeader {
    event: String,
}

impl ClientMessage {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::InvalidCredentials`] when an `authenticate`
    /// frame carries an undecodable payload (e.g. a non-numeric `userId`),
    /// and [`RealtimeError::InvalidMessage`] for malformed JSON, unknown
    /// events, other invalid payloads, or a blank room type.
    pub fn parse(text: &str) -> Result<Self, RealtimeError> {
        let msg: Self = serde_json::from_str(text).map_err(|e| {
            let event = serde_json::from_str::<FrameHeader>(text).map(|h| h.event);
            if event.as_deref().ok() == Some("authenticate") {
                RealtimeError::InvalidCredentials
            } else {
                RealtimeError::InvalidMessage(e.to_string())
            }
        })?;

        if let Self::JoinRoom(req) | Self::LeaveRoom(req) = &msg
            && req.room_type.trim().is_empty()
        {
            return Err(RealtimeError::InvalidMessage(
                "room type is required".to_string(),
            ));
        }
        Ok(msg)
    }
}
