//! Point-in-time aggregate views computed for admin dashboards.
//!
//! Snapshots are never stored: every request recomputes them from the
//! store, so the only freshness guarantee is "as of query time".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of entries in the recent-activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 20;

/// Order statuses counted as "active".
pub const ACTIVE_ORDER_STATUSES: [&str; 4] = ["pending", "confirmed", "processing", "shipped"];

/// Platform-wide counters and sums.
///
/// `Default` is the all-zero snapshot returned when the stats query fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SystemStats {
    /// All user accounts.
    pub total_users: i64,
    /// Accounts with the seller role.
    pub total_sellers: i64,
    /// Accounts with the admin role.
    pub total_admins: i64,
    /// Products with active status.
    pub active_products: i64,
    /// Orders that were not cancelled.
    pub total_orders: i64,
    /// Sum of delivered order totals; `0` when nothing was delivered.
    pub total_revenue: f64,
    /// Users that logged in during the last 24 hours.
    pub active_users_24h: i64,
    /// Orders placed during the last 24 hours.
    pub orders_24h: i64,
}

/// Kind of a recent-activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A user registered.
    NewUser,
    /// An order was placed.
    NewOrder,
}

/// One normalized entry of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntry {
    /// What happened.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Who it happened to (user or customer name).
    pub name: String,
    /// Short human-readable description.
    pub details: String,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
}

/// Merges the registration and order streams into a single feed.
///
/// The result is sorted by timestamp, newest first, and holds at most
/// `limit` entries.
#[must_use]
pub fn merge_recent_activity(
    registrations: Vec<ActivityEntry>,
    orders: Vec<ActivityEntry>,
    limit: usize,
) -> Vec<ActivityEntry> {
    let mut feed: Vec<ActivityEntry> = registrations.into_iter().chain(orders).collect();
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(limit);
    feed
}

/// Returns `true` if `status` counts toward the active-orders figure.
#[must_use]
pub fn is_active_order_status(status: &str) -> bool {
    ACTIVE_ORDER_STATUSES.contains(&status)
}
