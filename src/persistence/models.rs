//! Row types for aggregate and feed queries.

use chrono::{DateTime, Utc};

use crate::domain::snapshot::{ActivityEntry, ActivityKind, SystemStats};

/// Single-row result of the system stats query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatsRow {
    /// `COUNT(*)` of users.
    pub total_users: i64,
    /// `COUNT(*)` of sellers.
    pub total_sellers: i64,
    /// `COUNT(*)` of admins.
    pub total_admins: i64,
    /// `COUNT(*)` of active products.
    pub active_products: i64,
    /// `COUNT(*)` of non-cancelled orders.
    pub total_orders: i64,
    /// `COALESCE(SUM(..), 0)` of delivered order totals.
    pub total_revenue: Option<f64>,
    /// `COUNT(*)` of users that logged in recently.
    pub active_users_24h: i64,
    /// `COUNT(*)` of recent orders.
    pub orders_24h: i64,
}

impl From<StatsRow> for SystemStats {
    fn from(row: StatsRow) -> Self {
        Self {
            total_users: row.total_users,
            total_sellers: row.total_sellers,
            total_admins: row.total_admins,
            active_products: row.active_products,
            total_orders: row.total_orders,
            total_revenue: row.total_revenue.unwrap_or(0.0),
            active_users_24h: row.active_users_24h,
            orders_24h: row.orders_24h,
        }
    }
}

/// A recent user registration.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationRow {
    /// The user's display name.
    pub full_name: String,
    /// The user's role.
    pub role: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<RegistrationRow> for ActivityEntry {
    fn from(row: RegistrationRow) -> Self {
        Self {
            kind: ActivityKind::NewUser,
            name: row.full_name,
            details: format!("New {} registered", row.role),
            timestamp: row.created_at,
        }
    }
}

/// A recent order placement.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderPlacementRow {
    /// Human-facing order number.
    pub order_number: String,
    /// Order total.
    pub total_amount: f64,
    /// Purchasing user's display name.
    pub customer_name: Option<String>,
    /// Placement time.
    pub created_at: DateTime<Utc>,
}

impl From<OrderPlacementRow> for ActivityEntry {
    fn from(row: OrderPlacementRow) -> Self {
        Self {
            kind: ActivityKind::NewOrder,
            name: row
                .customer_name
                .unwrap_or_else(|| "Unknown customer".to_string()),
            details: format!("Order {} - ${:.2}", row.order_number, row.total_amount),
            timestamp: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_revenue_becomes_zero() {
        let row = StatsRow {
            total_users: 3,
            total_sellers: 1,
            total_admins: 1,
            active_products: 0,
            total_orders: 0,
            total_revenue: None,
            active_users_24h: 0,
            orders_24h: 0,
        };
        let stats = SystemStats::from(row);
        assert!(stats.total_revenue.abs() < f64::EPSILON);
        assert_eq!(stats.total_users, 3);
    }

    #[test]
    fn order_row_normalizes_details() {
        let entry = ActivityEntry::from(OrderPlacementRow {
            order_number: "ORD-1".to_string(),
            total_amount: 12.5,
            customer_name: Some("Bob".to_string()),
            created_at: Utc::now(),
        });
        assert_eq!(entry.kind, ActivityKind::NewOrder);
        assert_eq!(entry.name, "Bob");
        assert_eq!(entry.details, "Order ORD-1 - $12.50");
    }

    #[test]
    fn registration_row_normalizes_details() {
        let entry = ActivityEntry::from(RegistrationRow {
            full_name: "Grace".to_string(),
            role: "seller".to_string(),
            created_at: Utc::now(),
        });
        assert_eq!(entry.kind, ActivityKind::NewUser);
        assert_eq!(entry.details, "New seller registered");
    }
}
