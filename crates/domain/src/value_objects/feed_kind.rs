//! Feed kind value object
//!
//! The string keys are the ones stored in config entries, so they are part of
//! the persisted format and must not change.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// One of the five feeds the backend exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Every active bus in Istanbul
    AllFleet,
    /// Buses currently running a given line
    RouteFleet,
    /// Real-time ETAs at a stop
    StopArrivals,
    /// Planned departures of a line
    RouteSchedule,
    /// Service announcements for a line
    RouteAnnouncements,
}

impl FeedKind {
    /// All kinds, in menu order
    pub const ALL: [Self; 5] = [
        Self::AllFleet,
        Self::RouteFleet,
        Self::StopArrivals,
        Self::RouteSchedule,
        Self::RouteAnnouncements,
    ];

    /// Key stored in config entries
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::AllFleet => "all_fleet",
            Self::RouteFleet => "route_fleet",
            Self::StopArrivals => "stop_arrivals",
            Self::RouteSchedule => "route_schedule",
            Self::RouteAnnouncements => "route_announcements",
        }
    }

    /// Human-readable label shown in the setup flow
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AllFleet => "All Fleet (entire Istanbul)",
            Self::RouteFleet => "Route Fleet (buses on a specific line)",
            Self::StopArrivals => "Arrivals at Stop (real-time ETAs)",
            Self::RouteSchedule => "Route Schedule (planned departures)",
            Self::RouteAnnouncements => "Route Announcements (disruption alerts)",
        }
    }

    /// Label without the parenthesised hint
    #[must_use]
    pub fn short_label(&self) -> &'static str {
        let label = self.label();
        label.split('(').next().map_or(label, str::trim)
    }

    /// How often the coordinator polls this feed.
    ///
    /// Fleet positions and arrivals are latency sensitive; schedules and
    /// announcements rarely change.
    #[must_use]
    pub const fn update_interval(&self) -> Duration {
        match self {
            Self::AllFleet | Self::RouteFleet => Duration::from_secs(15),
            Self::StopArrivals => Duration::from_secs(30),
            Self::RouteAnnouncements => Duration::from_secs(300),
            Self::RouteSchedule => Duration::from_secs(3600),
        }
    }

    /// Attribute key holding the items of this feed
    #[must_use]
    pub const fn data_key(&self) -> &'static str {
        match self {
            Self::AllFleet | Self::RouteFleet => "buses",
            Self::StopArrivals => "arrivals",
            Self::RouteSchedule => "departures",
            Self::RouteAnnouncements => "announcements",
        }
    }

    /// Material Design icon for the sensor
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::AllFleet => "mdi:bus-multiple",
            Self::RouteFleet => "mdi:bus",
            Self::StopArrivals => "mdi:bus-clock",
            Self::RouteSchedule => "mdi:timetable",
            Self::RouteAnnouncements => "mdi:alert-circle-outline",
        }
    }

    /// Unit of the sensor value, `None` for plain counts
    #[must_use]
    pub const fn unit(&self) -> Option<&'static str> {
        match self {
            Self::StopArrivals | Self::RouteSchedule => Some("min"),
            Self::AllFleet | Self::RouteFleet | Self::RouteAnnouncements => None,
        }
    }

    /// Whether the feed is scoped to a line
    #[must_use]
    pub const fn requires_route(&self) -> bool {
        matches!(
            self,
            Self::RouteFleet | Self::RouteSchedule | Self::RouteAnnouncements
        )
    }

    /// Whether the feed is scoped to a stop
    #[must_use]
    pub const fn requires_stop(&self) -> bool {
        matches!(self, Self::StopArrivals)
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FeedKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| DomainError::UnknownFeedType(s.to_string()))
    }
}
