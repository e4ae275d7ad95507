//! Snapshot provider: on-demand aggregate views.
//!
//! Each computation has a `try_*` form that surfaces the query error (the
//! periodic refresher skips a metric on failure) and a fail-soft form that
//! logs and returns the zero value (the post-handshake snapshot always
//! delivers something).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::AdminEvent;
use crate::domain::admin_event::CountPayload;
use crate::domain::snapshot::{
    ActivityEntry, RECENT_ACTIVITY_LIMIT, SystemStats, merge_recent_activity,
};
use crate::error::RealtimeError;
use crate::persistence::{QueryGateway, with_timeout};

/// Look-back window for "last 24 hours" figures.
const RECENT_WINDOW_HOURS: i64 = 24;

/// Computes snapshots from the query gateway. Nothing is cached.
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    gateway: Arc<dyn QueryGateway>,
    query_timeout: Duration,
}

impl SnapshotProvider {
    /// Creates a provider over `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<dyn QueryGateway>, query_timeout: Duration) -> Self {
        Self {
            gateway,
            query_timeout,
        }
    }

    /// Computes platform counters.
    ///
    /// # Errors
    ///
    /// Returns the gateway error or a timeout.
    pub async fn try_system_stats(&self) -> Result<SystemStats, RealtimeError> {
        let since = Utc::now() - chrono::Duration::hours(RECENT_WINDOW_HOURS);
        with_timeout(
            "system_stats",
            self.query_timeout,
            self.gateway.system_stats(since),
        )
        .await
    }

    /// Computes the merged activity feed, newest first, at most 20 entries.
    ///
    /// # Errors
    ///
    /// Returns the first gateway error or a timeout from either stream.
    pub async fn try_recent_activity(&self) -> Result<Vec<ActivityEntry>, RealtimeError> {
        let since = Utc::now() - chrono::Duration::hours(RECENT_WINDOW_HOURS);
        let (registrations, orders) = tokio::try_join!(
            with_timeout(
                "recent_registrations",
                self.query_timeout,
                self.gateway
                    .recent_registrations(since, RECENT_ACTIVITY_LIMIT),
            ),
            with_timeout(
                "recent_orders",
                self.query_timeout,
                self.gateway.recent_orders(since, RECENT_ACTIVITY_LIMIT),
            ),
        )?;
        Ok(merge_recent_activity(
            registrations,
            orders,
            RECENT_ACTIVITY_LIMIT,
        ))
    }

    /// Counts orders in an active status.
    ///
    /// # Errors
    ///
    /// Returns the gateway error or a timeout.
    pub async fn try_active_orders_count(&self) -> Result<i64, RealtimeError> {
        with_timeout(
            "active_orders_count",
            self.query_timeout,
            self.gateway.active_orders_count(),
        )
        .await
    }

    /// Counts sellers awaiting approval.
    ///
    /// # Errors
    ///
    /// Returns the gateway error or a timeout.
    pub async fn try_pending_approvals_count(&self) -> Result<i64, RealtimeError> {
        with_timeout(
            "pending_approvals_count",
            self.query_timeout,
            self.gateway.pending_approvals_count(),
        )
        .await
    }

    /// Fail-soft [`Self::try_system_stats`]: all zeros on error.
    pub async fn system_stats(&self) -> SystemStats {
        self.try_system_stats().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to compute system stats");
            SystemStats::default()
        })
    }

    /// Fail-soft [`Self::try_recent_activity`]: empty feed on error.
    pub async fn recent_activity(&self) -> Vec<ActivityEntry> {
        self.try_recent_activity().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to compute recent activity");
            Vec::new()
        })
    }

    /// Fail-soft [`Self::try_active_orders_count`]: `0` on error.
    pub async fn active_orders_count(&self) -> i64 {
        self.try_active_orders_count().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to count active orders");
            0
        })
    }

    /// Fail-soft [`Self::try_pending_approvals_count`]: `0` on error.
    pub async fn pending_approvals_count(&self) -> i64 {
        self.try_pending_approvals_count().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to count pending approvals");
            0
        })
    }

    /// Computes the four-part snapshot sent after a successful handshake.
    ///
    /// The parts are computed concurrently and independently; a failed
    /// part is replaced by its zero value.
    pub async fn initial_snapshot(&self) -> [AdminEvent; 4] {
        let (stats, activity, active, pending) = tokio::join!(
            self.system_stats(),
            self.recent_activity(),
            self.active_orders_count(),
            self.pending_approvals_count(),
        );
        [
            AdminEvent::SystemStats(stats),
            AdminEvent::RecentActivity(activity),
            AdminEvent::ActiveOrders(CountPayload { count: active }),
            AdminEvent::PendingApprovals(CountPayload { count: pending }),
        ]
    }
}
