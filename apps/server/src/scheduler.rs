//! Background scheduler for package lifecycle status.
//!
//! Runs once at start and then on a fixed interval, closing packages that
//! are about to depart and completing those that have returned.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use amanah_core::packages::{PackageStatusServiceTrait, StatusRunSummary};
use amanah_core::utils::time_utils::now_utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::events::{EventBus, ServerEvent, PACKAGE_STATUS_UPDATED};

pub struct PackageStatusScheduler {
    service: Arc<dyn PackageStatusServiceTrait>,
    event_bus: EventBus,
    period: Duration,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PackageStatusScheduler {
    pub fn new(
        service: Arc<dyn PackageStatusServiceTrait>,
        event_bus: EventBus,
        period: Duration,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            service,
            event_bus,
            period,
            shutdown,
            task: Mutex::new(None),
        }
    }

    /// Runs one pass now. Errors are returned to the caller.
    pub async fn run_now(&self) -> amanah_core::Result<StatusRunSummary> {
        run_pass(self.service.as_ref(), &self.event_bus).await
    }

    /// Spawns the periodic task. Calling it while running is a no-op.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|p| p.into_inner());
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        self.shutdown.send_replace(false);

        let service = self.service.clone();
        let event_bus = self.event_bus.clone();
        let period = self.period;
        let mut stop = self.shutdown.subscribe();

        *task = Some(tokio::spawn(async move {
            info!(
                "Package status scheduler started ({}s interval)",
                period.as_secs()
            );
            // First tick completes immediately.
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = run_pass(service.as_ref(), &event_bus).await {
                            warn!("Scheduled package status update failed: {}", e);
                        }
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Package status scheduler stopped");
        }));
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn stop(&self) {
        self.shutdown.send_replace(true);
        let handle = self
            .task
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Package status scheduler task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

async fn run_pass(
    service: &dyn PackageStatusServiceTrait,
    event_bus: &EventBus,
) -> amanah_core::Result<StatusRunSummary> {
    let summary = service.run_once(now_utc()).await?;
    if summary.closed_count + summary.completed_count > 0 {
        info!(
            "Package status updated: {} closed, {} completed",
            summary.closed_count, summary.completed_count
        );
        match serde_json::to_value(summary) {
            Ok(payload) => {
                event_bus.publish(ServerEvent::with_payload(PACKAGE_STATUS_UPDATED, payload))
            }
            Err(e) => warn!("Failed to serialize status summary: {}", e),
        }
    } else {
        debug!("Package status check found nothing to change");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amanah_core::errors::Error;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingService {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PackageStatusServiceTrait for CountingService {
        async fn run_once(&self, _now: NaiveDateTime) -> amanah_core::Result<StatusRunSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Unexpected("database is locked".to_string()));
            }
            Ok(StatusRunSummary {
                closed_count: 1,
                completed_count: 0,
            })
        }
    }

    fn scheduler(fail: bool) -> (Arc<CountingService>, PackageStatusScheduler, EventBus) {
        let service = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            fail,
        });
        let bus = EventBus::new(16);
        let scheduler =
            PackageStatusScheduler::new(service.clone(), bus.clone(), Duration::from_secs(3600));
        (service, scheduler, bus)
    }

    #[tokio::test]
    async fn start_runs_immediately_and_stop_ends_the_task() {
        let (service, scheduler, bus) = scheduler(false);
        let mut events = bus.subscribe();

        scheduler.start();
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("first pass publishes")
            .unwrap();
        assert_eq!(event.name, PACKAGE_STATUS_UPDATED);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_running());

        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn tick_errors_do_not_stop_the_scheduler() {
        let (service, scheduler, _bus) = scheduler(true);
        scheduler.start();
        for _ in 0..50 {
            if service.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_running());
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn manual_run_propagates_errors() {
        let (_, failing, _) = scheduler(true);
        assert!(failing.run_now().await.is_err());

        let (_, working, _) = scheduler(false);
        let summary = working.run_now().await.unwrap();
        assert_eq!(summary.closed_count, 1);
    }
}
