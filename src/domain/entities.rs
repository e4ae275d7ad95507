//! Store-backed entities as they are pushed to admin dashboards.
//!
//! Each type is a denormalized read model: the store query already joins
//! the human-readable fields (customer and seller names) so clients can
//! render them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role value required for admin access.
pub const ADMIN_ROLE: &str = "admin";

/// Account status value required for admin access.
pub const ACTIVE_STATUS: &str = "active";

/// Identity of an authenticated administrator.
///
/// Fetched once during the handshake and never re-validated for the life
/// of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct AdminIdentity {
    /// User row identifier.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Account role; always `"admin"` for an identity produced by the handshake.
    pub role: String,
    /// Account status; always `"active"` for an identity produced by the handshake.
    pub status: String,
}

impl AdminIdentity {
    /// Returns `true` if the row carries the admin role and active status.
    #[must_use]
    pub fn is_active_admin(&self) -> bool {
        self.role == ADMIN_ROLE && self.status == ACTIVE_STATUS
    }
}

/// An order joined with its customer and seller names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct OrderDetails {
    /// Order row identifier.
    pub id: i64,
    /// Human-facing order number.
    pub order_number: String,
    /// Purchasing user.
    pub customer_id: i64,
    /// Purchasing user's display name.
    pub customer_name: Option<String>,
    /// Fulfilling seller, if assigned.
    pub seller_id: Option<i64>,
    /// Fulfilling seller's display name.
    pub seller_name: Option<String>,
    /// Order total.
    pub total_amount: f64,
    /// Current order status.
    pub status: String,
    /// Placement time.
    pub created_at: DateTime<Utc>,
}

/// A user account as shown in the admin feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct UserDetails {
    /// User row identifier.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Account role (`customer`, `seller`, `admin`).
    pub role: String,
    /// Account status (`active`, `pending`, `suspended`).
    pub status: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A product joined with its seller's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ProductDetails {
    /// Product row identifier.
    pub id: i64,
    /// Product title.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Listing status.
    pub status: String,
    /// Owning seller.
    pub seller_id: i64,
    /// Owning seller's display name.
    pub seller_name: Option<String>,
    /// Listing time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: &str, status: &str) -> AdminIdentity {
        AdminIdentity {
            id: 7,
            full_name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            role: role.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn only_active_admins_qualify() {
        assert!(identity("admin", "active").is_active_admin());
        assert!(!identity("seller", "active").is_active_admin());
        assert!(!identity("admin", "suspended").is_active_admin());
    }
}
