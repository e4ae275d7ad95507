//! Event broadcaster: producer-triggered fan-out to admin dashboards.
//!
//! Each `notify_*` call re-fetches the canonical, denormalized entity and
//! publishes it on the shared admin channel. None of them can fail from
//! the producer's point of view: the returned [`NotifyOutcome`] is
//! informational and may be ignored.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::admin_event::{
    AlertPayload, EntityPayload, RoomEventPayload, StatusChangePayload,
};
use crate::domain::{AdminEvent, EventBus, RoomMembership, RoomName};
use crate::error::RealtimeError;
use crate::persistence::{QueryGateway, with_timeout};

/// What a notify call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifyOutcome {
    /// The event was published.
    Delivered {
        /// Connections the event was handed to.
        receivers: usize,
    },
    /// The entity no longer exists; nothing was published.
    NotFound,
    /// The fetch failed; the error was logged and nothing was published.
    Failed,
}

/// Fetches entities and publishes admin events.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    gateway: Arc<dyn QueryGateway>,
    bus: EventBus,
    rooms: Arc<RoomMembership>,
    query_timeout: Duration,
}

impl Broadcaster {
    /// Creates a broadcaster publishing on `bus`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn QueryGateway>,
        bus: EventBus,
        rooms: Arc<RoomMembership>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            bus,
            rooms,
            query_timeout,
        }
    }

    /// Broadcasts `new-order` for `order_id`.
    pub async fn notify_new_order(&self, order_id: i64) -> NotifyOutcome {
        let fetched = with_timeout(
            "order_details",
            self.query_timeout,
            self.gateway.order_details(order_id),
        )
        .await;
        self.publish_fetched("new-order", order_id, fetched, |order| {
            AdminEvent::NewOrder(EntityPayload::now(order))
        })
    }

    /// Broadcasts `new-user` for `user_id`.
    pub async fn notify_new_user(&self, user_id: i64) -> NotifyOutcome {
        let fetched = with_timeout(
            "user_details",
            self.query_timeout,
            self.gateway.user_details(user_id),
        )
        .await;
        self.publish_fetched("new-user", user_id, fetched, |user| {
            AdminEvent::NewUser(EntityPayload::now(user))
        })
    }

    /// Broadcasts `new-product` for `product_id`.
    pub async fn notify_new_product(&self, product_id: i64) -> NotifyOutcome {
        let fetched = with_timeout(
            "product_details",
            self.query_timeout,
            self.gateway.product_details(product_id),
        )
        .await;
        self.publish_fetched("new-product", product_id, fetched, |product| {
            AdminEvent::NewProduct(EntityPayload::now(product))
        })
    }

    /// Broadcasts `order-status-change` for `order_id`.
    ///
    /// Members of the `order-{id}` monitoring room also get a `room-event`
    /// carrying only the order id and the new status. Room membership needs
    /// no authentication, so the denormalized order never goes to the room.
    pub async fn notify_order_status_change(
        &self,
        order_id: i64,
        new_status: &str,
    ) -> NotifyOutcome {
        let fetched = with_timeout(
            "order_details",
            self.query_timeout,
            self.gateway.order_details(order_id),
        )
        .await;
        let outcome = self.publish_fetched("order-status-change", order_id, fetched, |order| {
            AdminEvent::OrderStatusChange(StatusChangePayload {
                order,
                new_status: new_status.to_string(),
                timestamp: Utc::now(),
            })
        });
        if matches!(outcome, NotifyOutcome::Delivered { .. }) {
            self.bus.publish_to_room(RoomEventPayload {
                room: RoomName::new("order", &order_id.to_string()),
                payload: json!({"orderId": order_id, "newStatus": new_status}),
                timestamp: Utc::now(),
            });
        }
        outcome
    }

    /// Broadcasts `system-alert` with the caller's payload. No fetch is made.
    pub fn notify_system_alert(&self, payload: Value) -> NotifyOutcome {
        let receivers = self
            .bus
            .publish(AdminEvent::SystemAlert(AlertPayload::from_value(payload)));
        tracing::info!(receivers, "system alert broadcast");
        NotifyOutcome::Delivered { receivers }
    }

    /// Delivers a `room-event` to the members of `{room_type}-{room_id}`.
    pub async fn notify_room(&self, room_type: &str, room_id: &str, payload: Value) -> NotifyOutcome {
        let room = RoomName::new(room_type, room_id);
        let receivers = self.rooms.members(&room).await.len();
        if receivers == 0 {
            tracing::debug!(%room, "room event dropped, room is empty");
            return NotifyOutcome::Delivered { receivers };
        }
        self.bus.publish_to_room(RoomEventPayload {
            room,
            payload,
            timestamp: Utc::now(),
        });
        NotifyOutcome::Delivered { receivers }
    }

    fn publish_fetched<T>(
        &self,
        event_name: &'static str,
        entity_id: i64,
        fetched: Result<Option<T>, RealtimeError>,
        build: impl FnOnce(T) -> AdminEvent,
    ) -> NotifyOutcome {
        match fetched {
            Ok(Some(entity)) => {
                let receivers = self.bus.publish(build(entity));
                tracing::debug!(event = event_name, entity_id, receivers, "broadcast");
                NotifyOutcome::Delivered { receivers }
            }
            Ok(None) => {
                tracing::debug!(event = event_name, entity_id, "entity vanished before broadcast");
                NotifyOutcome::NotFound
            }
            Err(e) => {
                tracing::error!(event = event_name, entity_id, error = %e, "broadcast fetch failed");
                NotifyOutcome::Failed
            }
        }
    }
}
