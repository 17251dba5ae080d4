//! Feed snapshot
//!
//! One variant per [`FeedKind`], so a snapshot always knows which feed it
//! came from and consumers can match on it exhaustively.

use serde_json::{Map, Value};

use super::{Announcement, Arrival, BusPosition, Record, ScheduledDeparture};
use crate::value_objects::FeedKind;

/// The items returned by one successful poll
#[derive(Debug, Clone, PartialEq)]
pub enum FeedData {
    AllFleet(Vec<BusPosition>),
    RouteFleet(Vec<BusPosition>),
    StopArrivals(Vec<Arrival>),
    RouteSchedule(Vec<ScheduledDeparture>),
    RouteAnnouncements(Vec<Announcement>),
}

impl FeedData {
    /// An empty snapshot of the given kind
    #[must_use]
    pub const fn empty(kind: FeedKind) -> Self {
        match kind {
            FeedKind::AllFleet => Self::AllFleet(Vec::new()),
            FeedKind::RouteFleet => Self::RouteFleet(Vec::new()),
            FeedKind::StopArrivals => Self::StopArrivals(Vec::new()),
            FeedKind::RouteSchedule => Self::RouteSchedule(Vec::new()),
            FeedKind::RouteAnnouncements => Self::RouteAnnouncements(Vec::new()),
        }
    }

    /// The feed this snapshot belongs to
    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        match self {
            Self::AllFleet(_) => FeedKind::AllFleet,
            Self::RouteFleet(_) => FeedKind::RouteFleet,
            Self::StopArrivals(_) => FeedKind::StopArrivals,
            Self::RouteSchedule(_) => FeedKind::RouteSchedule,
            Self::RouteAnnouncements(_) => FeedKind::RouteAnnouncements,
        }
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::AllFleet(items) | Self::RouteFleet(items) => items.len(),
            Self::StopArrivals(items) => items.len(),
            Self::RouteSchedule(items) => items.len(),
            Self::RouteAnnouncements(items) => items.len(),
        }
    }

    /// Whether the poll returned nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every item as a plain JSON object
    #[must_use]
    pub fn item_maps(&self) -> Vec<Map<String, Value>> {
        fn maps<T: Record>(items: &[T]) -> Vec<Map<String, Value>> {
            items.iter().map(Record::as_map).collect()
        }

        match self {
            Self::AllFleet(items) | Self::RouteFleet(items) => maps(items),
            Self::StopArrivals(items) => maps(items),
            Self::RouteSchedule(items) => maps(items),
            Self::RouteAnnouncements(items) => maps(items),
        }
    }
}
