//! In-memory query gateway.
//!
//! Used when `PERSISTENCE_ENABLED=false` and by the test suite. The
//! records mirror the columns the PostgreSQL queries read, and every
//! query applies the same predicates in Rust.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::QueryGateway;
use crate::domain::AdminIdentity;
use crate::domain::entities::{ACTIVE_STATUS, ADMIN_ROLE, OrderDetails, ProductDetails, UserDetails};
use crate::domain::snapshot::{ActivityEntry, ActivityKind, SystemStats, is_active_order_status};
use crate::error::RealtimeError;

/// A `users` row.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Row id.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// `customer`, `seller` or `admin`.
    pub role: String,
    /// `active`, `pending`, `suspended`, ...
    pub status: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Builds a user registered now, never logged in.
    #[must_use]
    pub fn new(id: i64, full_name: &str, email: &str, role: &str, status: &str) -> Self {
        Self {
            id,
            full_name: full_name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
            last_login: None,
        }
    }
}

/// An `orders` row.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    /// Row id.
    pub id: i64,
    /// Human-facing order number.
    pub order_number: String,
    /// Purchasing user.
    pub customer_id: i64,
    /// Fulfilling seller.
    pub seller_id: Option<i64>,
    /// Order total.
    pub total_amount: f64,
    /// Order status.
    pub status: String,
    /// Placement time.
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Builds an order placed now.
    #[must_use]
    pub fn new(id: i64, customer_id: i64, total_amount: f64, status: &str) -> Self {
        Self {
            id,
            order_number: format!("ORD-{id:06}"),
            customer_id,
            seller_id: None,
            total_amount,
            status: status.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A `products` row.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    /// Row id.
    pub id: i64,
    /// Product title.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Listing status.
    pub status: String,
    /// Owning seller.
    pub seller_id: i64,
    /// Listing time.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i64, UserRecord>,
    orders: BTreeMap<i64, OrderRecord>,
    products: BTreeMap<i64, ProductRecord>,
}

impl Store {
    fn user_name(&self, id: Option<i64>) -> Option<String> {
        id.and_then(|id| self.users.get(&id))
            .map(|u| u.full_name.clone())
    }
}

/// Query gateway over in-process tables.
#[derive(Debug, Default)]
pub struct InMemoryQueryGateway {
    store: RwLock<Store>,
}

impl InMemoryQueryGateway {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one active admin (id 1) for local runs.
    pub async fn with_default_admin() -> Self {
        let gateway = Self::new();
        gateway
            .insert_user(UserRecord::new(
                1,
                "Administrator",
                "admin@localhost",
                ADMIN_ROLE,
                ACTIVE_STATUS,
            ))
            .await;
        gateway
    }

    /// Inserts or replaces a user.
    pub async fn insert_user(&self, user: UserRecord) {
        self.store.write().await.users.insert(user.id, user);
    }

    /// Inserts or replaces an order.
    pub async fn insert_order(&self, order: OrderRecord) {
        self.store.write().await.orders.insert(order.id, order);
    }

    /// Inserts or replaces a product.
    pub async fn insert_product(&self, product: ProductRecord) {
        self.store.write().await.products.insert(product.id, product);
    }

    #[cfg(test)]
    pub(crate) async fn delete_order(&self, order_id: i64) -> bool {
        self.store.write().await.orders.remove(&order_id).is_some()
    }
}

/// Converts a row count to the `COUNT(*)` type.
fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl QueryGateway for InMemoryQueryGateway {
    async fn find_active_admin(
        &self,
        user_id: i64,
    ) -> Result<Option<AdminIdentity>, RealtimeError> {
        let store = self.store.read().await;
        Ok(store
            .users
            .get(&user_id)
            .filter(|u| u.role == ADMIN_ROLE && u.status == ACTIVE_STATUS)
            .map(|u| AdminIdentity {
                id: u.id,
                full_name: u.full_name.clone(),
                email: u.email.clone(),
                role: u.role.clone(),
                status: u.status.clone(),
            }))
    }

    async fn system_stats(&self, since: DateTime<Utc>) -> Result<SystemStats, RealtimeError> {
        let store = self.store.read().await;
        let users = store.users.values();
        let orders = store.orders.values();
        Ok(SystemStats {
            total_users: count(store.users.len()),
            total_sellers: count(users.clone().filter(|u| u.role == "seller").count()),
            total_admins: count(users.clone().filter(|u| u.role == ADMIN_ROLE).count()),
            active_products: count(
                store
                    .products
                    .values()
                    .filter(|p| p.status == ACTIVE_STATUS)
                    .count(),
            ),
            total_orders: count(orders.clone().filter(|o| o.status != "cancelled").count()),
            total_revenue: orders
                .clone()
                .filter(|o| o.status == "delivered")
                .map(|o| o.total_amount)
                .sum(),
            active_users_24h: count(
                users
                    .filter(|u| u.last_login.is_some_and(|t| t >= since))
                    .count(),
            ),
            orders_24h: count(orders.filter(|o| o.created_at >= since).count()),
        })
    }

    async fn recent_registrations(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError> {
        let store = self.store.read().await;
        let mut rows: Vec<&UserRecord> = store
            .users
            .values()
            .filter(|u| u.created_at >= since)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|u| ActivityEntry {
                kind: ActivityKind::NewUser,
                name: u.full_name.clone(),
                details: format!("New {} registered", u.role),
                timestamp: u.created_at,
            })
            .collect())
    }

    async fn recent_orders(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError> {
        let store = self.store.read().await;
        let mut rows: Vec<&OrderRecord> = store
            .orders
            .values()
            .filter(|o| o.created_at >= since)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|o| ActivityEntry {
                kind: ActivityKind::NewOrder,
                name: store
                    .user_name(Some(o.customer_id))
                    .unwrap_or_else(|| "Unknown customer".to_string()),
                details: format!("Order {} - ${:.2}", o.order_number, o.total_amount),
                timestamp: o.created_at,
            })
            .collect())
    }

    async fn active_orders_count(&self) -> Result<i64, RealtimeError> {
        let store = self.store.read().await;
        Ok(count(
            store
                .orders
                .values()
                .filter(|o| is_active_order_status(&o.status))
                .count(),
        ))
    }

    async fn pending_approvals_count(&self) -> Result<i64, RealtimeError> {
        let store = self.store.read().await;
        Ok(count(
            store
                .users
                .values()
                .filter(|u| u.role == "seller" && u.status == "pending")
                .count(),
        ))
    }

    async fn order_details(&self, order_id: i64) -> Result<Option<OrderDetails>, RealtimeError> {
        let store = self.store.read().await;
        Ok(store.orders.get(&order_id).map(|o| OrderDetails {
            id: o.id,
            order_number: o.order_number.clone(),
            customer_id: o.customer_id,
            customer_name: store.user_name(Some(o.customer_id)),
            seller_id: o.seller_id,
            seller_name: store.user_name(o.seller_id),
            total_amount: o.total_amount,
            status: o.status.clone(),
            created_at: o.created_at,
        }))
    }

    async fn user_details(&self, user_id: i64) -> Result<Option<UserDetails>, RealtimeError> {
        let store = self.store.read().await;
        Ok(store.users.get(&user_id).map(|u| UserDetails {
            id: u.id,
            full_name: u.full_name.clone(),
            email: u.email.clone(),
            role: u.role.clone(),
            status: u.status.clone(),
            created_at: u.created_at,
        }))
    }

    async fn product_details(
        &self,
        product_id: i64,
    ) -> Result<Option<ProductDetails>, RealtimeError> {
        let store = self.store.read().await;
        Ok(store.products.get(&product_id).map(|p| ProductDetails {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            status: p.status.clone(),
            seller_id: p.seller_id,
            seller_name: store.user_name(Some(p.seller_id)),
            created_at: p.created_at,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn admin_lookup_requires_role_and_status() {
        let gateway = InMemoryQueryGateway::new();
        gateway
            .insert_user(UserRecord::new(1, "Ada", "ada@x.com", "admin", "active"))
            .await;
        gateway
            .insert_user(UserRecord::new(2, "Sam", "sam@x.com", "seller", "active"))
            .await;
        gateway
            .insert_user(UserRecord::new(3, "Old", "old@x.com", "admin", "suspended"))
            .await;

        assert!(matches!(gateway.find_active_admin(1).await, Ok(Some(_))));
        assert!(matches!(gateway.find_active_admin(2).await, Ok(None)));
        assert!(matches!(gateway.find_active_admin(3).await, Ok(None)));
        assert!(matches!(gateway.find_active_admin(99).await, Ok(None)));
    }

    #[tokio::test]
    async fn stats_count_by_predicate() {
        let gateway = InMemoryQueryGateway::new();
        let mut buyer = UserRecord::new(1, "Bob", "bob@x.com", "customer", "active");
        buyer.last_login = Some(Utc::now());
        gateway.insert_user(buyer).await;
        gateway
            .insert_user(UserRecord::new(2, "Sam", "sam@x.com", "seller", "pending"))
            .await;
        gateway.insert_order(OrderRecord::new(10, 1, 40.0, "delivered")).await;
        gateway.insert_order(OrderRecord::new(11, 1, 5.0, "cancelled")).await;
        gateway.insert_order(OrderRecord::new(12, 1, 7.0, "shipped")).await;

        let since = Utc::now() - Duration::hours(24);
        let Ok(stats) = gateway.system_stats(since).await else {
            panic!("stats query failed");
        };
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_sellers, 1);
        assert_eq!(stats.total_orders, 2);
        assert!((stats.total_revenue - 40.0).abs() < f64::EPSILON);
        assert_eq!(stats.active_users_24h, 1);
        assert_eq!(stats.orders_24h, 3);

        assert_eq!(gateway.active_orders_count().await.ok(), Some(1));
        assert_eq!(gateway.pending_approvals_count().await.ok(), Some(1));
    }

    #[tokio::test]
    async fn revenue_is_zero_without_delivered_orders() {
        let gateway = InMemoryQueryGateway::new();
        gateway.insert_order(OrderRecord::new(1, 1, 99.0, "pending")).await;
        let Ok(stats) = gateway.system_stats(Utc::now()).await else {
            panic!("stats query failed");
        };
        assert!(stats.total_revenue.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn order_details_join_names() {
        let gateway = InMemoryQueryGateway::new();
        gateway
            .insert_user(UserRecord::new(1, "Bob", "bob@x.com", "customer", "active"))
            .await;
        gateway
            .insert_user(UserRecord::new(2, "Shop", "shop@x.com", "seller", "active"))
            .await;
        let mut order = OrderRecord::new(5, 1, 10.0, "pending");
        order.seller_id = Some(2);
        gateway.insert_order(order).await;

        let Ok(Some(details)) = gateway.order_details(5).await else {
            panic!("order should exist");
        };
        assert_eq!(details.customer_name.as_deref(), Some("Bob"));
        assert_eq!(details.seller_name.as_deref(), Some("Shop"));

        assert!(gateway.delete_order(5).await);
        assert!(matches!(gateway.order_details(5).await, Ok(None)));
    }

    #[tokio::test]
    async fn old_rows_are_excluded_from_feeds() {
        let gateway = InMemoryQueryGateway::new();
        let mut old = UserRecord::new(1, "Old", "old@x.com", "customer", "active");
        old.created_at = Utc::now() - Duration::days(3);
        gateway.insert_user(old).await;
        gateway
            .insert_user(UserRecord::new(2, "New", "new@x.com", "customer", "active"))
            .await;

        let since = Utc::now() - Duration::hours(24);
        let Ok(feed) = gateway.recent_registrations(since, 20).await else {
            panic!("feed query failed");
        };
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.first().map(|e| e.name.as_str()), Some("New"));
    }
}
