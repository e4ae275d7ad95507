//! Server → client events pushed to admin dashboards.
//!
//! Every outbound WebSocket frame is one [`AdminEvent`], serialized as
//! `{"event": "<kebab-case name>", "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entities::{AdminIdentity, OrderDetails, ProductDetails, UserDetails};
use super::room::RoomName;
use super::snapshot::{ActivityEntry, SystemStats};

/// Acknowledgment of an `authenticate` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthAck {
    /// Whether the connection is now an admin connection.
    pub success: bool,
    /// The admin identity on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AdminIdentity>,
    /// Generic failure message; never carries internal detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthAck {
    /// Message sent when no active admin matches the credentials.
    pub const INVALID_CREDENTIALS: &'static str = "Invalid credentials";
    /// Message sent when the lookup itself failed.
    pub const AUTHENTICATION_FAILED: &'static str = "Authentication failed";

    /// Successful acknowledgment carrying the identity.
    #[must_use]
    pub const fn accepted(user: AdminIdentity) -> Self {
        Self {
            success: true,
            user: Some(user),
            message: None,
        }
    }

    /// Failed acknowledgment with a generic message.
    #[must_use]
    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            user: None,
            message: Some(message.to_string()),
        }
    }
}

/// A single counter payload (`{"count": n}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountPayload {
    /// The counted value.
    pub count: i64,
}

/// A denormalized entity plus the time the event was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPayload<T> {
    /// The entity fields, inlined.
    #[serde(flatten)]
    pub entity: T,
    /// Event generation time.
    pub timestamp: DateTime<Utc>,
}

impl<T> EntityPayload<T> {
    /// Stamps `entity` with the current time.
    #[must_use]
    pub fn now(entity: T) -> Self {
        Self {
            entity,
            timestamp: Utc::now(),
        }
    }
}

/// Order status transition payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangePayload {
    /// The order after the transition.
    #[serde(flatten)]
    pub order: OrderDetails,
    /// Status requested by the producer.
    #[serde(rename = "newStatus")]
    pub new_status: String,
    /// Event generation time.
    pub timestamp: DateTime<Utc>,
}

/// Caller-supplied alert fields plus a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Alert fields, inlined. Always holds the generation `timestamp`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AlertPayload {
    /// Key under which the generation time is stored.
    pub const TIMESTAMP_KEY: &'static str = "timestamp";

    /// Wraps an arbitrary JSON value. Objects are inlined; any other value
    /// is placed under a `message` key. A caller-supplied `timestamp` is
    /// replaced by the generation time.
    #[must_use]
    pub fn from_value(payload: Value) -> Self {
        let mut fields = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("message".to_string(), other);
                map
            }
        };
        fields.insert(
            Self::TIMESTAMP_KEY.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        Self { fields }
    }
}

/// Acknowledgment of a room join or leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAck {
    /// The room name (`{type}-{id}`).
    pub room: RoomName,
    /// Whether membership actually changed.
    pub changed: bool,
}

/// Acknowledgment of `set-preferences`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesAck {
    /// `false` when the connection is not authenticated.
    pub stored: bool,
}

/// Payload delivered to members of a monitoring room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEventPayload {
    /// Target room.
    pub room: RoomName,
    /// Producer-supplied payload.
    pub payload: Value,
    /// Event generation time.
    pub timestamp: DateTime<Utc>,
}

/// Error reply for malformed client frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
}

/// Event pushed from the service to one or more admin connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum AdminEvent {
    /// Handshake result, sent to the requesting connection.
    Authenticated(AuthAck),
    /// Initial system stats, sent after authentication.
    SystemStats(SystemStats),
    /// Initial activity feed, sent after authentication.
    RecentActivity(Vec<ActivityEntry>),
    /// Initial active-order count, sent after authentication.
    ActiveOrders(CountPayload),
    /// Initial pending-approval count, sent after authentication.
    PendingApprovals(CountPayload),
    /// An order was placed.
    NewOrder(EntityPayload<OrderDetails>),
    /// A user registered.
    NewUser(EntityPayload<UserDetails>),
    /// A product was listed.
    NewProduct(EntityPayload<ProductDetails>),
    /// An order changed status.
    OrderStatusChange(StatusChangePayload),
    /// Operator-facing alert.
    SystemAlert(AlertPayload),
    /// Periodic refresh of system stats.
    SystemStatsUpdate(SystemStats),
    /// Periodic refresh of the active-order count.
    ActiveOrdersUpdate(CountPayload),
    /// Periodic refresh of the pending-approval count.
    PendingApprovalsUpdate(CountPayload),
    /// Room join acknowledgment.
    RoomJoined(RoomAck),
    /// Room leave acknowledgment.
    RoomLeft(RoomAck),
    /// Preferences acknowledgment.
    PreferencesUpdated(PreferencesAck),
    /// Producer event scoped to one monitoring room.
    RoomEvent(RoomEventPayload),
    /// Malformed or unknown client frame.
    Error(ErrorPayload),
}

impl AdminEvent {
    /// Returns the wire name of the event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Authenticated(_) => "authenticated",
            Self::SystemStats(_) => "system-stats",
            Self::RecentActivity(_) => "recent-activity",
            Self::ActiveOrders(_) => "active-orders",
            Self::PendingApprovals(_) => "pending-approvals",
            Self::NewOrder(_) => "new-order",
            Self::NewUser(_) => "new-user",
            Self::NewProduct(_) => "new-product",
            Self::OrderStatusChange(_) => "order-status-change",
            Self::SystemAlert(_) => "system-alert",
            Self::SystemStatsUpdate(_) => "system-stats-update",
            Self::ActiveOrdersUpdate(_) => "active-orders-update",
            Self::PendingApprovalsUpdate(_) => "pending-approvals-update",
            Self::RoomJoined(_) => "room-joined",
            Self::RoomLeft(_) => "room-left",
            Self::PreferencesUpdated(_) => "preferences-updated",
            Self::RoomEvent(_) => "room-event",
            Self::Error(_) => "error",
        }
    }

    /// Builds an error reply.
    #[must_use]
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code,
            message: message.into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> OrderDetails {
        OrderDetails {
            id: 42,
            order_number: "ORD-42".to_string(),
            customer_id: 3,
            customer_name: Some("Bob".to_string()),
            seller_id: Some(9),
            seller_name: Some("Shop".to_string()),
            total_amount: 19.5,
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn wire_name_matches_serde_tag() {
        let events = [
            AdminEvent::SystemStatsUpdate(SystemStats::default()),
            AdminEvent::ActiveOrdersUpdate(CountPayload { count: 1 }),
            AdminEvent::PendingApprovals(CountPayload { count: 0 }),
            AdminEvent::NewOrder(EntityPayload::now(order())),
            AdminEvent::error(400, "bad"),
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap_or_default();
            assert_eq!(json.get("event"), Some(&json!(event.name())));
        }
    }

    #[test]
    fn entity_fields_are_inlined_with_timestamp() {
        let event = AdminEvent::NewOrder(EntityPayload::now(order()));
        let json = serde_json::to_value(&event).unwrap_or_default();
        let Some(data) = json.get("data") else {
            panic!("missing data");
        };
        assert_eq!(data.get("order_number"), Some(&json!("ORD-42")));
        assert_eq!(data.get("customer_name"), Some(&json!("Bob")));
        assert!(data.get("timestamp").is_some());
    }

    #[test]
    fn status_change_carries_new_status() {
        let event = AdminEvent::OrderStatusChange(StatusChangePayload {
            order: order(),
            new_status: "shipped".to_string(),
            timestamp: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json.pointer("/data/newStatus"), Some(&json!("shipped")));
        assert_eq!(json.pointer("/data/id"), Some(&json!(42)));
    }

    #[test]
    fn alert_inlines_objects_and_wraps_scalars() {
        let alert = AlertPayload::from_value(json!({"level": "critical", "message": "disk"}));
        assert_eq!(alert.fields.get("level"), Some(&json!("critical")));

        let alert = AlertPayload::from_value(json!("plain text"));
        assert_eq!(alert.fields.get("message"), Some(&json!("plain text")));
        assert!(alert.fields.contains_key(AlertPayload::TIMESTAMP_KEY));
    }

    #[test]
    fn alert_timestamp_overrides_caller_value() {
        let event = AdminEvent::SystemAlert(AlertPayload::from_value(
            json!({"message": "x", "timestamp": "caller"}),
        ));
        let Ok(text) = serde_json::to_string(&event) else {
            panic!("alert should serialize");
        };
        assert_eq!(text.matches("\"timestamp\"").count(), 1);

        let json: Value = serde_json::from_str(&text).unwrap_or_default();
        let Some(Value::String(stamp)) = json.pointer("/data/timestamp") else {
            panic!("missing timestamp");
        };
        assert_ne!(stamp, "caller");
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn failed_ack_omits_user() {
        let event = AdminEvent::Authenticated(AuthAck::rejected(AuthAck::INVALID_CREDENTIALS));
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json.pointer("/data/success"), Some(&json!(false)));
        assert_eq!(json.pointer("/data/message"), Some(&json!("Invalid credentials")));
        assert!(json.pointer("/data/user").is_none());
    }
}
