//! PostgreSQL implementation of the query gateway.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::QueryGateway;
use super::models::{OrderPlacementRow, RegistrationRow, StatsRow};
use crate::config::RealtimeConfig;
use crate::domain::AdminIdentity;
use crate::domain::entities::{OrderDetails, ProductDetails, UserDetails};
use crate::domain::snapshot::{ActivityEntry, SystemStats};
use crate::error::RealtimeError;

const FIND_ACTIVE_ADMIN: &str = "SELECT id, full_name, email, role, status FROM users \
     WHERE id = $1 AND role = 'admin' AND status = 'active'";

const SYSTEM_STATS: &str = "SELECT \
     (SELECT COUNT(*) FROM users) AS total_users, \
     (SELECT COUNT(*) FROM users WHERE role = 'seller') AS total_sellers, \
     (SELECT COUNT(*) FROM users WHERE role = 'admin') AS total_admins, \
     (SELECT COUNT(*) FROM products WHERE status = 'active') AS active_products, \
     (SELECT COUNT(*) FROM orders WHERE status <> 'cancelled') AS total_orders, \
     (SELECT COALESCE(SUM(total_amount), 0)::float8 FROM orders WHERE status = 'delivered') AS total_revenue, \
     (SELECT COUNT(*) FROM users WHERE last_login >= $1) AS active_users_24h, \
     (SELECT COUNT(*) FROM orders WHERE created_at >= $1) AS orders_24h";

const RECENT_REGISTRATIONS: &str = "SELECT full_name, role, created_at FROM users \
     WHERE created_at >= $1 ORDER BY created_at DESC LIMIT $2";

const RECENT_ORDERS: &str = "SELECT o.order_number, o.total_amount::float8 AS total_amount, \
     c.full_name AS customer_name, o.created_at \
     FROM orders o LEFT JOIN users c ON c.id = o.customer_id \
     WHERE o.created_at >= $1 ORDER BY o.created_at DESC LIMIT $2";

const ACTIVE_ORDERS_COUNT: &str =
    "SELECT COUNT(*) FROM orders WHERE status IN ('pending', 'confirmed', 'processing', 'shipped')";

const PENDING_APPROVALS_COUNT: &str =
    "SELECT COUNT(*) FROM users WHERE role = 'seller' AND status = 'pending'";

const ORDER_DETAILS: &str = "SELECT o.id, o.order_number, o.customer_id, \
     c.full_name AS customer_name, o.seller_id, s.full_name AS seller_name, \
     o.total_amount::float8 AS total_amount, o.status, o.created_at \
     FROM orders o \
     LEFT JOIN users c ON c.id = o.customer_id \
     LEFT JOIN users s ON s.id = o.seller_id \
     WHERE o.id = $1";

const USER_DETAILS: &str =
    "SELECT id, full_name, email, role, status, created_at FROM users WHERE id = $1";

const PRODUCT_DETAILS: &str = "SELECT p.id, p.name, p.price::float8 AS price, p.status, \
     p.seller_id, s.full_name AS seller_name, p.created_at \
     FROM products p LEFT JOIN users s ON s.id = p.seller_id \
     WHERE p.id = $1";

/// PostgreSQL-backed query gateway using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgQueryGateway {
    pool: PgPool,
}

impl PgQueryGateway {
    /// Creates a gateway over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::QueryFailed`] if the database is unreachable.
    pub async fn connect(config: &RealtimeConfig) -> Result<Self, RealtimeError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl QueryGateway for PgQueryGateway {
    async fn find_active_admin(
        &self,
        user_id: i64,
    ) -> Result<Option<AdminIdentity>, RealtimeError> {
        let row = sqlx::query_as::<_, AdminIdentity>(FIND_ACTIVE_ADMIN)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn system_stats(&self, since: DateTime<Utc>) -> Result<SystemStats, RealtimeError> {
        let row = sqlx::query_as::<_, StatsRow>(SYSTEM_STATS)
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn recent_registrations(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError> {
        let rows = sqlx::query_as::<_, RegistrationRow>(RECENT_REGISTRATIONS)
            .bind(since)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }

    async fn recent_orders(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError> {
        let rows = sqlx::query_as::<_, OrderPlacementRow>(RECENT_ORDERS)
            .bind(since)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }

    async fn active_orders_count(&self) -> Result<i64, RealtimeError> {
        let count = sqlx::query_scalar::<_, i64>(ACTIVE_ORDERS_COUNT)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn pending_approvals_count(&self) -> Result<i64, RealtimeError> {
        let count = sqlx::query_scalar::<_, i64>(PENDING_APPROVALS_COUNT)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn order_details(&self, order_id: i64) -> Result<Option<OrderDetails>, RealtimeError> {
        let row = sqlx::query_as::<_, OrderDetails>(ORDER_DETAILS)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn user_details(&self, user_id: i64) -> Result<Option<UserDetails>, RealtimeError> {
        let row = sqlx::query_as::<_, UserDetails>(USER_DETAILS)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn product_details(
        &self,
        product_id: i64,
    ) -> Result<Option<ProductDetails>, RealtimeError> {
        let row = sqlx::query_as::<_, ProductDetails>(PRODUCT_DETAILS)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
