//! Response bodies for the admin introspection endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::connection_registry::AdminConnection;

/// Body of `GET /api/v1/admins/count`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct AdminCountResponse {
    /// Number of authenticated admin connections.
    pub count: usize,
}

/// Body of `GET /api/v1/admins`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminListResponse {
    /// Authenticated connections, oldest handshake first.
    pub admins: Vec<AdminConnection>,
    /// Length of `admins`.
    pub count: usize,
}

impl From<Vec<AdminConnection>> for AdminListResponse {
    fn from(admins: Vec<AdminConnection>) -> Self {
        Self {
            count: admins.len(),
            admins,
        }
    }
}
