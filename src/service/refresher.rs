//! Periodic refresher: fixed-interval aggregate broadcasts.
//!
//! Every tick recomputes system stats, the active-order count and the
//! pending-approval count, and broadcasts each one that succeeded. A
//! failed metric is logged and skipped for that tick only.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::snapshot_provider::SnapshotProvider;
use crate::domain::admin_event::CountPayload;
use crate::domain::{AdminEvent, EventBus};

/// What one tick broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// `true` if the tick ran no queries because no admin was connected.
    pub skipped: bool,
    /// `system-stats-update` was broadcast.
    pub system_stats: bool,
    /// `active-orders-update` was broadcast.
    pub active_orders: bool,
    /// `pending-approvals-update` was broadcast.
    pub pending_approvals: bool,
}

/// Recomputes aggregates and broadcasts them on a timer.
#[derive(Debug, Clone)]
pub struct PeriodicRefresher {
    snapshots: SnapshotProvider,
    bus: EventBus,
    interval: Duration,
}

impl PeriodicRefresher {
    /// Creates a refresher ticking every `interval`.
    #[must_use]
    pub const fn new(snapshots: SnapshotProvider, bus: EventBus, interval: Duration) -> Self {
        Self {
            snapshots,
            bus,
            interval,
        }
    }

    /// Runs one refresh.
    pub async fn tick(&self) -> TickReport {
        if self.bus.receiver_count() == 0 {
            return TickReport {
                skipped: true,
                ..TickReport::default()
            };
        }

        let (stats, active, pending) = tokio::join!(
            self.snapshots.try_system_stats(),
            self.snapshots.try_active_orders_count(),
            self.snapshots.try_pending_approvals_count(),
        );

        let mut report = TickReport::default();
        match stats {
            Ok(stats) => {
                self.bus.publish(AdminEvent::SystemStatsUpdate(stats));
                report.system_stats = true;
            }
            Err(e) => tracing::error!(error = %e, "periodic system stats refresh failed"),
        }
        match active {
            Ok(count) => {
                self.bus
                    .publish(AdminEvent::ActiveOrdersUpdate(CountPayload { count }));
                report.active_orders = true;
            }
            Err(e) => tracing::error!(error = %e, "periodic active orders refresh failed"),
        }
        match pending {
            Ok(count) => {
                self.bus
                    .publish(AdminEvent::PendingApprovalsUpdate(CountPayload { count }));
                report.pending_approvals = true;
            }
            Err(e) => tracing::error!(error = %e, "periodic pending approvals refresh failed"),
        }
        report
    }

    /// Starts ticking on a background task.
    ///
    /// The first tick fires one full interval after the call.
    #[must_use]
    pub fn spawn(self) -> RefresherHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval_secs = period.as_secs(), "periodic refresher started");
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let report = self.tick().await;
                        tracing::trace!(?report, "refresh tick");
                    }
                }
            }
            tracing::info!("periodic refresher stopped");
        });
        RefresherHandle { shutdown_tx, task }
    }
}

/// Handle to a running refresher.
#[derive(Debug)]
pub struct RefresherHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RefresherHandle {
    /// Stops the timer and waits for an in-flight tick to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "periodic refresher task ended abnormally");
        }
    }

    /// Returns `true` once the background task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::persistence::memory::{InMemoryQueryGateway, OrderRecord};
    use crate::persistence::test_support::FlakyGateway;

    fn refresher(gateway: Arc<FlakyGateway>, bus: &EventBus) -> PeriodicRefresher {
        let snapshots = SnapshotProvider::new(gateway, Duration::from_secs(1));
        PeriodicRefresher::new(snapshots, bus.clone(), Duration::from_millis(20))
    }

    async fn gateway() -> Arc<FlakyGateway> {
        let store = InMemoryQueryGateway::new();
        store.insert_order(OrderRecord::new(1, 1, 10.0, "pending")).await;
        Arc::new(FlakyGateway::new(store))
    }

    #[tokio::test]
    async fn tick_broadcasts_all_three() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let refresher = refresher(gateway().await, &bus);

        let report = refresher.tick().await;
        assert!(report.system_stats && report.active_orders && report.pending_approvals);

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.name());
        }
        assert_eq!(
            names,
            [
                "system-stats-update",
                "active-orders-update",
                "pending-approvals-update"
            ]
        );
    }

    #[tokio::test]
    async fn failed_metric_is_skipped_others_still_sent() {
        let gateway = gateway().await;
        gateway.fail("active_orders_count");
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let refresher = refresher(gateway, &bus);

        let report = refresher.tick().await;
        assert!(report.system_stats);
        assert!(!report.active_orders);
        assert!(report.pending_approvals);

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.name());
        }
        assert!(names.contains(&"system-stats-update"));
        assert!(!names.contains(&"active-orders-update"));
    }

    #[tokio::test]
    async fn no_listeners_means_no_queries() {
        let gateway = gateway().await;
        let bus = EventBus::new(16);
        let refresher = refresher(Arc::clone(&gateway), &bus);

        let report = refresher.tick().await;
        assert!(report.skipped);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn spawned_refresher_ticks_until_shutdown() {
        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let handle = refresher(gateway().await, &bus).spawn();

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        let Ok(Ok(event)) = first else {
            panic!("expected a periodic update");
        };
        assert_eq!(event.name(), "system-stats-update");

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_timer() {
        let gateway = gateway().await;
        gateway.fail("system_stats");
        gateway.fail("active_orders_count");
        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let handle = refresher(gateway, &bus).spawn();

        for _ in 0..2 {
            let next = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
            let Ok(Ok(event)) = next else {
                panic!("expected a periodic update");
            };
            assert_eq!(event.name(), "pending-approvals-update");
        }
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }
}
