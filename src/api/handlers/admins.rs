//! Admin introspection handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{AdminCountResponse, AdminListResponse};
use crate::app_state::AppState;

/// `GET /admins` — List authenticated admin connections.
#[utoipa::path(
    get,
    path = "/api/v1/admins",
    tag = "Admins",
    summary = "List connected admins",
    description = "Returns every authenticated connection with its identity, preferences and handshake time.",
    responses(
        (status = 200, description = "Connected admins", body = AdminListResponse),
    )
)]
pub async fn list_admins(State(state): State<AppState>) -> Json<AdminListResponse> {
    Json(state.service.connected_admins().await.into())
}

/// `GET /admins/count` — Count authenticated admin connections.
#[utoipa::path(
    get,
    path = "/api/v1/admins/count",
    tag = "Admins",
    summary = "Count connected admins",
    responses(
        (status = 200, description = "Connected admin count", body = AdminCountResponse),
    )
)]
pub async fn count_admins(State(state): State<AppState>) -> Json<AdminCountResponse> {
    Json(AdminCountResponse {
        count: state.service.connected_admins_count().await,
    })
}

/// Admin routes, relative to `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admins", get(list_admins))
        .route("/admins/count", get(count_admins))
}
