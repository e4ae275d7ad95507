//! Producer notify handlers.
//!
//! Each endpoint hands one domain event to the broadcaster and answers
//! `202 Accepted` with the [`NotifyOutcome`]. A broadcast failure is never
//! turned into an HTTP error.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::api::dto::StatusChangeRequest;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RealtimeError};
use crate::service::NotifyOutcome;

/// `POST /notify/orders/{id}` — Broadcast `new-order`.
#[utoipa::path(
    post,
    path = "/api/v1/notify/orders/{id}",
    tag = "Notify",
    summary = "Announce a new order",
    description = "Fetches the order with customer and seller names and broadcasts `new-order` to every authenticated admin.",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 202, description = "Broadcast attempted", body = NotifyOutcome),
    )
)]
pub async fn notify_new_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let outcome = state.service.notify_new_order(id).await;
    (StatusCode::ACCEPTED, Json(outcome))
}

/// `POST /notify/users/{id}` — Broadcast `new-user`.
#[utoipa::path(
    post,
    path = "/api/v1/notify/users/{id}",
    tag = "Notify",
    summary = "Announce a new user",
    description = "Fetches the user and broadcasts `new-user` to every authenticated admin.",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 202, description = "Broadcast attempted", body = NotifyOutcome),
    )
)]
pub async fn notify_new_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let outcome = state.service.notify_new_user(id).await;
    (StatusCode::ACCEPTED, Json(outcome))
}

/// `POST /notify/products/{id}` — Broadcast `new-product`.
#[utoipa::path(
    post,
    path = "/api/v1/notify/products/{id}",
    tag = "Notify",
    summary = "Announce a new product",
    description = "Fetches the product with its seller name and broadcasts `new-product` to every authenticated admin.",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 202, description = "Broadcast attempted", body = NotifyOutcome),
    )
)]
pub async fn notify_new_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let outcome = state.service.notify_new_product(id).await;
    (StatusCode::ACCEPTED, Json(outcome))
}

/// `POST /notify/orders/{id}/status` — Broadcast `order-status-change`.
///
/// # Errors
///
/// Returns [`RealtimeError::InvalidRequest`] if the status is blank.
#[utoipa::path(
    post,
    path = "/api/v1/notify/orders/{id}/status",
    tag = "Notify",
    summary = "Announce an order status change",
    description = "Fetches the order and broadcasts `order-status-change` to every authenticated admin and to the `order-{id}` room.",
    params(("id" = i64, Path, description = "Order id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 202, description = "Broadcast attempted", body = NotifyOutcome),
        (status = 400, description = "Blank status", body = ErrorResponse),
    )
)]
pub async fn notify_order_status_change(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<impl IntoResponse, RealtimeError> {
    let status = req
        .normalized_status()
        .ok_or_else(|| RealtimeError::InvalidRequest("status must not be empty".to_string()))?;
    let outcome = state.service.notify_order_status_change(id, status).await;
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}

/// `POST /notify/alerts` — Broadcast `system-alert`.
#[utoipa::path(
    post,
    path = "/api/v1/notify/alerts",
    tag = "Notify",
    summary = "Broadcast a system alert",
    description = "Broadcasts the request body, plus a timestamp, as `system-alert`. Non-object bodies are sent under a `message` key.",
    request_body(content = Object, description = "Arbitrary alert fields"),
    responses(
        (status = 202, description = "Broadcast attempted", body = NotifyOutcome),
    )
)]
pub async fn notify_system_alert(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let outcome = state.service.notify_system_alert(payload);
    (StatusCode::ACCEPTED, Json(outcome))
}

/// `POST /notify/rooms/{type}/{id}` — Deliver `room-event` to one room.
#[utoipa::path(
    post,
    path = "/api/v1/notify/rooms/{type}/{id}",
    tag = "Notify",
    summary = "Send an event to a monitoring room",
    description = "Delivers the request body as `room-event` to the connections that joined `{type}-{id}`.",
    params(
        ("type" = String, Path, description = "Entity type, e.g. `order`"),
        ("id" = String, Path, description = "Entity id"),
    ),
    request_body(content = Object, description = "Arbitrary event payload"),
    responses(
        (status = 202, description = "Delivery attempted", body = NotifyOutcome),
    )
)]
pub async fn notify_room(
    State(state): State<AppState>,
    Path((room_type, room_id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let outcome = state
        .service
        .notify_room(&room_type, &room_id, payload)
        .await;
    (StatusCode::ACCEPTED, Json(outcome))
}

/// Notify routes, relative to `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notify/orders/{id}", post(notify_new_order))
        .route("/notify/orders/{id}/status", post(notify_order_status_change))
        .route("/notify/users/{id}", post(notify_new_user))
        .route("/notify/products/{id}", post(notify_new_product))
        .route("/notify/alerts", post(notify_system_alert))
        .route("/notify/rooms/{type}/{id}", post(notify_room))
}
