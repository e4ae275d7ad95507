//! Persistence layer: read-only queries against the commerce store.
//!
//! The store itself belongs to the wider platform; this service only reads
//! it through the [`QueryGateway`] trait. [`postgres::PgQueryGateway`]
//! talks to PostgreSQL via `sqlx`, [`memory::InMemoryQueryGateway`] backs
//! development runs with persistence disabled and the test suite.

pub mod memory;
pub mod models;
pub mod postgres;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::AdminIdentity;
use crate::domain::entities::{OrderDetails, ProductDetails, UserDetails};
use crate::domain::snapshot::{ActivityEntry, SystemStats};
use crate::error::RealtimeError;

/// Parameterized read queries the real-time layer issues.
///
/// Every method is a single round trip. Lookups by id return `Ok(None)`
/// when the row does not exist.
#[async_trait]
pub trait QueryGateway: Send + Sync + fmt::Debug {
    /// Finds a user that has the admin role and active status.
    async fn find_active_admin(&self, user_id: i64)
    -> Result<Option<AdminIdentity>, RealtimeError>;

    /// Computes platform counters; the 24h figures count rows at or after `since`.
    async fn system_stats(&self, since: DateTime<Utc>) -> Result<SystemStats, RealtimeError>;

    /// Lists user registrations at or after `since`, newest first.
    async fn recent_registrations(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError>;

    /// Lists order placements at or after `since`, newest first.
    async fn recent_orders(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, RealtimeError>;

    /// Counts orders in an active status.
    async fn active_orders_count(&self) -> Result<i64, RealtimeError>;

    /// Counts seller accounts awaiting approval.
    async fn pending_approvals_count(&self) -> Result<i64, RealtimeError>;

    /// Fetches one order joined with customer and seller names.
    async fn order_details(&self, order_id: i64) -> Result<Option<OrderDetails>, RealtimeError>;

    /// Fetches one user.
    async fn user_details(&self, user_id: i64) -> Result<Option<UserDetails>, RealtimeError>;

    /// Fetches one product joined with its seller name.
    async fn product_details(
        &self,
        product_id: i64,
    ) -> Result<Option<ProductDetails>, RealtimeError>;
}

/// Runs a gateway call with an upper time bound.
///
/// # Errors
///
/// Returns the call's own error, or [`RealtimeError::QueryTimeout`] if it
/// does not finish within `timeout`.
pub async fn with_timeout<T, F>(
    query: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, RealtimeError>
where
    F: Future<Output = Result<T, RealtimeError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(RealtimeError::QueryTimeout {
            query,
            timeout_secs: timeout.as_secs(),
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fast_call_passes_through() {
        let result = with_timeout("fast", Duration::from_secs(1), async { Ok(5) }).await;
        assert_eq!(result.ok(), Some(5));
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let result: Result<(), _> = with_timeout("slow", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(
            result,
            Err(RealtimeError::QueryTimeout { query: "slow", .. })
        ));
    }
}
