//! Failure injection for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::QueryGateway;
use super::memory::InMemoryQueryGateway;
use crate::domain::AdminIdentity;
use crate::domain::entities::{OrderDetails, ProductDetails, UserDetails};
use crate::domain::snapshot::{ActivityEntry, SystemStats};
use crate::error::RealtimeError;

/// Wraps the in-memory gateway and fails the named queries on demand.
#[derive(Debug, Default)]
pub(crate) struct FlakyGateway {
    pub(crate) inner: InMemoryQueryGateway,
    failing: Mutex<HashSet<&'static str>>,
    calls: AtomicUsize,
}

impl FlakyGateway {
    pub(crate) fn new(inner: InMemoryQueryGateway) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail(&self, query: &'static str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(query);
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, query: &'static str) -> Result<(), RealtimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(query))
            .unwrap_or(false);
        if failing {
            Err(RealtimeError::QueryFailed(format!("{query}: injected failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl QueryGateway for FlakyGateway {
    async fn find_active_admin(
        &self,
        user_id: i64,
    ) -> Result<Option<AdminIdentity>, RealtimeError> {
        self.check("find_active_admin")?;
        self.inner.find_active_admin(user_id).await
    }

    async fn system_stats(&self, since: DateTime<Utc>) -> Result<SystemStats, RealtimeError> {
        self.check("system_stats")?;
        self.inner.system_stats(since).await
    }

    async fn recent_registrations(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError> {
        self.check("recent_registrations")?;
        self.inner.recent_registrations(since, limit).await
    }

    async fn recent_orders(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError> {
        self.check("recent_orders")?;
        self.inner.recent_orders(since, limit).await
    }

    async fn active_orders_count(&self) -> Result<i64, RealtimeError> {
        self.check("active_orders_count")?;
        self.inner.active_orders_count().await
    }

    async fn pending_approvals_count(&self) -> Result<i64, RealtimeError> {
        self.check("pending_approvals_count")?;
        self.inner.pending_approvals_count().await
    }

    async fn order_details(&self, order_id: i64) -> Result<Option<OrderDetails>, RealtimeError> {
        self.check("order_details")?;
        self.inner.order_details(order_id).await
    }

    async fn user_details(&self, user_id: i64) -> Result<Option<UserDetails>, RealtimeError> {
        self.check("user_details")?;
        self.inner.user_details(user_id).await
    }

    async fn product_details(
        &self,
        product_id: i64,
    ) -> Result<Option<ProductDetails>, RealtimeError> {
        self.check("product_details")?;
        self.inner.product_details(product_id).await
    }
}
