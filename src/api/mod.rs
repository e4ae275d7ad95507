//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! Producer endpoints are mounted under `/api/v1` behind the producer
//! token check; `/health` sits at the root and stays open.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router(state: &AppState) -> Router<AppState> {
    let producer_auth =
        axum::middleware::from_fn_with_state(state.clone(), middleware::require_producer_token);

    Router::new()
        .nest("/api/v1", handlers::routes().route_layer(producer_auth))
        .merge(handlers::system::routes())
}
