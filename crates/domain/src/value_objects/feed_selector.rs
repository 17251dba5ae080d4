//! Feed selector
//!
//! Binds a [`FeedKind`] to exactly the parameters it needs, so dispatching a
//! poll and projecting its result are exhaustive matches with no
//! "unknown feed" branch left to handle at runtime.

use std::fmt;

use super::{FeedKind, RouteCode, StopCode};
use crate::errors::DomainError;

/// A feed together with its bound route or stop parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedSelector {
    /// Every active bus
    FleetAll,
    /// Buses on one line
    FleetByRoute { route: RouteCode },
    /// ETAs at one stop, optionally only for buses passing `via`
    ArrivalsByStop {
        stop: StopCode,
        via: Option<StopCode>,
    },
    /// Planned departures of one line
    ScheduleByRoute { route: RouteCode },
    /// Announcements for one line
    AnnouncementsByRoute { route: RouteCode },
}

impl FeedSelector {
    /// Build a selector from the raw values kept in a config entry.
    ///
    /// Parameters a feed does not use are ignored. An empty `via` is treated
    /// as absent.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeedType` for an unrecognised key, `MissingParameter`
    /// when a required route or stop code is absent, or the code's own
    /// validation error.
    pub fn from_parts(
        feed_type: &str,
        route: Option<&str>,
        stop: Option<&str>,
        via: Option<&str>,
    ) -> Result<Self, DomainError> {
        let kind: FeedKind = feed_type.parse()?;

        let route_code = || {
            route
                .ok_or_else(|| DomainError::missing_parameter(feed_type, "hat_kodu"))
                .and_then(RouteCode::new)
        };

        Ok(match kind {
            FeedKind::AllFleet => Self::FleetAll,
            FeedKind::RouteFleet => Self::FleetByRoute {
                route: route_code()?,
            },
            FeedKind::RouteSchedule => Self::ScheduleByRoute {
                route: route_code()?,
            },
            FeedKind::RouteAnnouncements => Self::AnnouncementsByRoute {
                route: route_code()?,
            },
            FeedKind::StopArrivals => {
                let stop = stop
                    .ok_or_else(|| DomainError::missing_parameter(feed_type, "dcode"))
                    .and_then(StopCode::new)?;
                let via = via
                    .filter(|v| !v.trim().is_empty())
                    .map(StopCode::new)
                    .transpose()?;
                Self::ArrivalsByStop { stop, via }
            },
        })
    }

    /// The feed kind this selector polls
    #[must_use]
    pub const fn kind(&self) -> FeedKind {
        match self {
            Self::FleetAll => FeedKind::AllFleet,
            Self::FleetByRoute { .. } => FeedKind::RouteFleet,
            Self::ArrivalsByStop { .. } => FeedKind::StopArrivals,
            Self::ScheduleByRoute { .. } => FeedKind::RouteSchedule,
            Self::AnnouncementsByRoute { .. } => FeedKind::RouteAnnouncements,
        }
    }

    /// Bound route code, if the feed is line scoped
    #[must_use]
    pub const fn route(&self) -> Option<&RouteCode> {
        match self {
            Self::FleetByRoute { route }
            | Self::ScheduleByRoute { route }
            | Self::AnnouncementsByRoute { route } => Some(route),
            Self::FleetAll | Self::ArrivalsByStop { .. } => None,
        }
    }

    /// Bound stop code, if the feed is stop scoped
    #[must_use]
    pub const fn stop(&self) -> Option<&StopCode> {
        match self {
            Self::ArrivalsByStop { stop, .. } => Some(stop),
            _ => None,
        }
    }

    /// Identity used to detect duplicate entries, e.g. `route_fleet_500T`
    #[must_use]
    pub fn unique_id(&self) -> String {
        let kind = self.kind();
        match self {
            Self::FleetAll => kind.key().to_string(),
            Self::FleetByRoute { route }
            | Self::ScheduleByRoute { route }
            | Self::AnnouncementsByRoute { route } => {
                format!("{}_{}", kind.key(), route.normalized())
            },
            Self::ArrivalsByStop { stop, .. } => format!("{}_{stop}", kind.key()),
        }
    }

    /// Entry title shown to the user
    #[must_use]
    pub fn title(&self) -> String {
        let kind = self.kind();
        match self {
            Self::FleetAll => format!("IETT — {}", kind.label()),
            Self::FleetByRoute { route }
            | Self::ScheduleByRoute { route }
            | Self::AnnouncementsByRoute { route } => {
                format!("IETT — {} {}", route.normalized(), kind.short_label())
            },
            Self::ArrivalsByStop { stop, .. } => format!("IETT — Stop {stop} Arrivals"),
        }
    }
}

impl fmt::Display for FeedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FleetAll => write!(f, "{}", self.kind()),
            Self::FleetByRoute { route }
            | Self::ScheduleByRoute { route }
            | Self::AnnouncementsByRoute { route } => write!(f, "{}[{route}]", self.kind()),
            Self::ArrivalsByStop { stop, via: None } => write!(f, "{}[{stop}]", self.kind()),
            Self::ArrivalsByStop {
                stop,
                via: Some(via),
            } => write!(f, "{}[{stop} via {via}]", self.kind()),
        }
    }
}
