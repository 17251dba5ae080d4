//! Interval scheduler for feed refreshes
//!
//! Each loaded entry gets one tokio task that refreshes its coordinator at
//! the feed's interval. Every tick reports a [`FeedEvent`] on a bounded
//! channel; events are dropped when nobody drains it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use application::FeedCoordinator;
use chrono::{DateTime, Utc};
use domain::FeedKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Scheduler errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The entry already has a refresh task
    #[error("Entry already scheduled: {0}")]
    AlreadyScheduled(String),

    /// No refresh task for the entry
    #[error("Entry not scheduled: {0}")]
    NotScheduled(String),
}

/// Outcome of one scheduled refresh
#[derive(Debug, Clone, Serialize)]
pub struct FeedEvent {
    pub entry_id: String,
    pub feed: FeedKind,
    pub success: bool,
    pub error: Option<String>,
    /// Items in the snapshot after the refresh
    pub items: Option<usize>,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Capacity of the event channel
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

const fn default_event_buffer_size() -> usize {
    100
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl SchedulerConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the event buffer is empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.event_buffer_size == 0 {
            return Err("scheduler.event_buffer_size must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Runs one refresh loop per entry
pub struct FeedScheduler {
    tasks: RwLock<HashMap<String, JoinHandle<()>>>,
    event_tx: mpsc::Sender<FeedEvent>,
    event_rx: RwLock<Option<mpsc::Receiver<FeedEvent>>>,
}

impl std::fmt::Debug for FeedScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedScheduler")
            .field("tasks", &self.tasks.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for FeedScheduler {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl FeedScheduler {
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer_size.max(1));
        Self {
            tasks: RwLock::new(HashMap::new()),
            event_tx,
            event_rx: RwLock::new(Some(event_rx)),
        }
    }

    /// Take the event receiver; only the first call gets it
    pub fn take_event_receiver(&self) -> Option<mpsc::Receiver<FeedEvent>> {
        self.event_rx.write().take()
    }

    /// Start refreshing `coordinator` every `update_interval`
    ///
    /// The first refresh happens one interval from now; setup has already
    /// fetched the initial snapshot. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is already scheduled.
    pub fn schedule(
        &self,
        entry_id: &str,
        coordinator: Arc<FeedCoordinator>,
    ) -> Result<(), SchedulerError> {
        let mut tasks = self.tasks.write();
        if tasks.get(entry_id).is_some_and(|task| !task.is_finished()) {
            return Err(SchedulerError::AlreadyScheduled(entry_id.to_string()));
        }

        let period = coordinator.update_interval();
        let events = self.event_tx.clone();
        let id = entry_id.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let event = run_refresh(&id, &coordinator).await;
                if events.try_send(event).is_err() {
                    debug!(entry_id = %id, "Feed event dropped");
                }
            }
        });

        info!(entry_id, interval_secs = period.as_secs(), "Feed scheduled");
        tasks.insert(entry_id.to_string(), handle);
        Ok(())
    }

    /// Stop the refresh task of an entry
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not scheduled.
    pub fn stop(&self, entry_id: &str) -> Result<(), SchedulerError> {
        let handle = self
            .tasks
            .write()
            .remove(entry_id)
            .ok_or_else(|| SchedulerError::NotScheduled(entry_id.to_string()))?;
        handle.abort();
        info!(entry_id, "Feed unscheduled");
        Ok(())
    }

    #[must_use]
    pub fn is_scheduled(&self, entry_id: &str) -> bool {
        self.tasks.read().contains_key(entry_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Abort every refresh task
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self.tasks.write().drain().collect();
        for (_, handle) in &tasks {
            handle.abort();
        }
        if !tasks.is_empty() {
            info!(count = tasks.len(), "Feed scheduler stopped");
        }
    }
}

impl Drop for FeedScheduler {
    fn drop(&mut self) {
        for handle in self.tasks.get_mut().values() {
            handle.abort();
        }
    }
}

async fn run_refresh(entry_id: &str, coordinator: &FeedCoordinator) -> FeedEvent {
    let start = Instant::now();
    let result = coordinator.refresh().await;
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (success, error, items) = match result {
        Ok(data) => (true, None, Some(data.len())),
        Err(e) => {
            warn!(entry_id, feed = %coordinator.kind(), error = %e, "Scheduled refresh failed");
            (false, Some(e.to_string()), coordinator.data().map(|d| d.len()))
        },
    };

    FeedEvent {
        entry_id: entry_id.to_string(),
        feed: coordinator.kind(),
        success,
        error,
        items,
        duration_ms,
        completed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use application::ports::{JsonObject, MiddleApiPort};
    use application::ApplicationError;
    use async_trait::async_trait;
    use domain::{
        Announcement, Arrival, BusPosition, FeedSelector, RouteCode, RouteStop,
        ScheduledDeparture, StopCode,
    };

    use super::*;

    /// Fleet backend that fails on the calls listed in `fail_on`
    #[derive(Default)]
    struct CountingFleet {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    #[async_trait]
    impl MiddleApiPort for CountingFleet {
        async fn all_buses(&self) -> Result<Vec<BusPosition>, ApplicationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&call) {
                return Err(ApplicationError::backend("timed out"));
            }
            Ok(vec![BusPosition::new("A-001", 41.0, 29.0, 0, "00:00:00"); call])
        }

        async fn route_buses(&self, _: &RouteCode) -> Result<Vec<BusPosition>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn stop_arrivals(
            &self,
            _: &StopCode,
            _: Option<StopCode>,
        ) -> Result<Vec<Arrival>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn route_schedule(
            &self,
            _: &RouteCode,
        ) -> Result<Vec<ScheduledDeparture>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn announcements(&self, _: &RouteCode) -> Result<Vec<Announcement>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn route_stops(&self, _: &RouteCode) -> Result<Vec<RouteStop>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn stop_detail(&self, _: &StopCode) -> Result<JsonObject, ApplicationError> {
            Ok(JsonObject::new())
        }

        async fn nearby_stops(&self, _: f64, _: f64) -> Result<Vec<JsonObject>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn garages(&self) -> Result<Vec<JsonObject>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn is_healthy(&self) -> bool {
            true
        }
    }

    fn fleet_coordinator(fail_on: Vec<usize>) -> (Arc<CountingFleet>, Arc<FeedCoordinator>) {
        let api = Arc::new(CountingFleet {
            calls: AtomicUsize::new(0),
            fail_on,
        });
        let coordinator = Arc::new(FeedCoordinator::new(
            FeedSelector::FleetAll,
            Arc::clone(&api) as Arc<dyn MiddleApiPort>,
        ));
        (api, coordinator)
    }

    #[test]
    fn config_defaults_and_validation() {
        let config = SchedulerConfig::default();
        assert_eq!(config.event_buffer_size, 100);
        assert!(config.validate().is_ok());
        assert!(
            SchedulerConfig {
                event_buffer_size: 0
            }
            .validate()
            .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_interval() {
        let scheduler = FeedScheduler::default();
        let mut events = scheduler.take_event_receiver().unwrap();
        let (api, coordinator) = fleet_coordinator(Vec::new());

        scheduler.schedule("fleet", Arc::clone(&coordinator)).unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(first.entry_id, "fleet");
        assert_eq!(first.feed, FeedKind::AllFleet);
        assert!(first.success);
        assert_eq!(first.items, Some(1));

        let second = events.recv().await.unwrap();
        assert_eq!(second.items, Some(2));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.data().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_interval() {
        let scheduler = FeedScheduler::default();
        let (api, coordinator) = fleet_coordinator(Vec::new());
        let interval = coordinator.update_interval();

        scheduler.schedule("fleet", coordinator).unwrap();
        time::sleep(interval - Duration::from_secs(1)).await;

        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_snapshot_and_reports() {
        let scheduler = FeedScheduler::default();
        let mut events = scheduler.take_event_receiver().unwrap();
        let (_, coordinator) = fleet_coordinator(vec![2]);

        scheduler.schedule("fleet", Arc::clone(&coordinator)).unwrap();

        assert!(events.recv().await.unwrap().success);
        let failed = events.recv().await.unwrap();
        assert!(!failed.success);
        assert!(failed.error.unwrap().contains("timed out"));
        assert_eq!(failed.items, Some(1));
        assert!(!coordinator.last_update_success());

        let recovered = events.recv().await.unwrap();
        assert!(recovered.success);
        assert_eq!(recovered.items, Some(3));
        assert!(coordinator.last_update_success());
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_schedule_is_rejected() {
        let scheduler = FeedScheduler::default();
        let (_, coordinator) = fleet_coordinator(Vec::new());

        scheduler.schedule("fleet", Arc::clone(&coordinator)).unwrap();
        assert_eq!(
            scheduler.schedule("fleet", coordinator),
            Err(SchedulerError::AlreadyScheduled("fleet".to_string()))
        );
        assert_eq!(scheduler.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_refreshes() {
        let scheduler = FeedScheduler::default();
        let (api, coordinator) = fleet_coordinator(Vec::new());
        let interval = coordinator.update_interval();

        scheduler.schedule("fleet", coordinator).unwrap();
        scheduler.stop("fleet").unwrap();
        time::sleep(interval * 3).await;

        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert!(!scheduler.is_scheduled("fleet"));
        assert_eq!(
            scheduler.stop("fleet"),
            Err(SchedulerError::NotScheduled("fleet".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_clears_all_tasks() {
        let scheduler = FeedScheduler::default();
        let (_, a) = fleet_coordinator(Vec::new());
        let (_, b) = fleet_coordinator(Vec::new());
        scheduler.schedule("a", a).unwrap();
        scheduler.schedule("b", b).unwrap();

        scheduler.shutdown();

        assert!(scheduler.is_empty());
    }

    #[test]
    fn receiver_is_taken_once() {
        let scheduler = FeedScheduler::default();
        assert!(scheduler.take_event_receiver().is_some());
        assert!(scheduler.take_event_receiver().is_none());
    }
}
