//! Feed coordinator
//!
//! Owns the latest snapshot of one feed and refreshes it through the
//! [`MiddleApiPort`]. The host drives the schedule; the coordinator only knows
//! its interval.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use domain::{FeedData, FeedKind, FeedSelector};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::MiddleApiPort;

/// Outcome bookkeeping of the most recent refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    /// Whether the last refresh succeeded
    pub last_update_success: bool,
    /// When the snapshot was last replaced
    pub last_updated: Option<DateTime<Utc>>,
    /// Error text of the last failed refresh
    pub last_error: Option<String>,
}

/// Polls one feed and keeps its latest snapshot
pub struct FeedCoordinator {
    selector: FeedSelector,
    api: Arc<dyn MiddleApiPort>,
    snapshot: ArcSwapOption<FeedData>,
    status: RwLock<RefreshStatus>,
}

impl fmt::Debug for FeedCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedCoordinator")
            .field("selector", &self.selector)
            .field("api", &"<MiddleApiPort>")
            .field("items", &self.snapshot.load().as_ref().map(|d| d.len()))
            .field("status", &*self.status.read())
            .finish()
    }
}

impl FeedCoordinator {
    /// Create a coordinator with no data yet
    #[must_use]
    pub fn new(selector: FeedSelector, api: Arc<dyn MiddleApiPort>) -> Self {
        Self {
            selector,
            api,
            snapshot: ArcSwapOption::empty(),
            status: RwLock::new(RefreshStatus::default()),
        }
    }

    /// The feed this coordinator polls
    #[must_use]
    pub const fn selector(&self) -> &FeedSelector {
        &self.selector
    }

    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        self.selector.kind()
    }

    /// Coordinator name used in logs, e.g. `iett_route_fleet`
    #[must_use]
    pub fn name(&self) -> String {
        format!("iett_{}", self.kind())
    }

    /// Time between scheduled refreshes
    #[must_use]
    pub const fn update_interval(&self) -> Duration {
        self.kind().update_interval()
    }

    /// The last good snapshot, if any refresh has succeeded
    #[must_use]
    pub fn data(&self) -> Option<Arc<FeedData>> {
        self.snapshot.load_full()
    }

    /// Whether the most recent refresh succeeded
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.status.read().last_update_success
    }

    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        self.status.read().clone()
    }

    /// Fetch the feed once without touching the snapshot
    pub async fn fetch(&self) -> Result<FeedData, ApplicationError> {
        let data = match &self.selector {
            FeedSelector::FleetAll => FeedData::AllFleet(self.api.all_buses().await?),
            FeedSelector::FleetByRoute { route } => {
                FeedData::RouteFleet(self.api.route_buses(route).await?)
            },
            FeedSelector::ArrivalsByStop { stop, via } => {
                FeedData::StopArrivals(self.api.stop_arrivals(stop, via.clone()).await?)
            },
            FeedSelector::ScheduleByRoute { route } => {
                FeedData::RouteSchedule(self.api.route_schedule(route).await?)
            },
            FeedSelector::AnnouncementsByRoute { route } => {
                FeedData::RouteAnnouncements(self.api.announcements(route).await?)
            },
        };
        Ok(data)
    }

    /// Fetch the feed and swap in the new snapshot.
    ///
    /// On failure the previous snapshot stays in place and the coordinator
    /// reports itself unavailable until the next successful refresh.
    #[instrument(skip(self), fields(feed = %self.selector))]
    pub async fn refresh(&self) -> Result<Arc<FeedData>, ApplicationError> {
        match self.fetch().await {
            Ok(data) => {
                let data = Arc::new(data);
                self.snapshot.store(Some(Arc::clone(&data)));
                *self.status.write() = RefreshStatus {
                    last_update_success: true,
                    last_updated: Some(Utc::now()),
                    last_error: None,
                };
                debug!(items = data.len(), "Feed refreshed");
                Ok(data)
            },
            Err(e) => {
                let reason = e.to_string();
                warn!(error = %reason, "Feed refresh failed");
                {
                    let mut status = self.status.write();
                    status.last_update_success = false;
                    status.last_error = Some(reason.clone());
                }
                Err(ApplicationError::RefreshFailed {
                    feed: self.selector.to_string(),
                    reason,
                    source: Box::new(e),
                })
            },
        }
    }

    /// Initial refresh performed while setting up an entry
    pub async fn first_refresh(&self) -> Result<(), ApplicationError> {
        match self.refresh().await {
            Ok(data) => {
                info!(feed = %self.selector, items = data.len(), "First refresh done");
                Ok(())
            },
            Err(ApplicationError::RefreshFailed {
                feed,
                reason,
                source,
            }) => Err(ApplicationError::NotReady {
                entry: feed,
                reason,
                source,
            }),
            Err(e) => Err(e),
        }
    }
}
