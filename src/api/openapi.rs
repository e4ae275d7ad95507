//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{AdminCountResponse, AdminListResponse, StatusChangeRequest};
use super::handlers::{admins, notify, system};
use crate::domain::AdminIdentity;
use crate::domain::connection_registry::AdminConnection;
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::NotifyOutcome;

/// Generated OpenAPI description, served by Swagger UI when enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "admin-realtime",
        description = "Real-time notification service for e-commerce admin dashboards."
    ),
    paths(
        notify::notify_new_order,
        notify::notify_new_user,
        notify::notify_new_product,
        notify::notify_order_status_change,
        notify::notify_system_alert,
        notify::notify_room,
        admins::list_admins,
        admins::count_admins,
        system::health_handler,
    ),
    components(schemas(
        NotifyOutcome,
        StatusChangeRequest,
        AdminCountResponse,
        AdminListResponse,
        AdminConnection,
        AdminIdentity,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Notify", description = "Producer-triggered broadcasts"),
        (name = "Admins", description = "Connected admin introspection"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;
