//! Sensor projection
//!
//! Turns a feed snapshot into a single numeric state plus attributes, and
//! wraps a coordinator as the one sensor entity each config entry exposes.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, Utc};
use domain::{FeedData, FeedKind};
use serde::Serialize;
use serde_json::{Map, Value};

use super::FeedCoordinator;
use crate::config_entry::ConfigEntry;

/// State value and attributes derived from a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// `None` means unknown
    pub value: Option<u32>,
    pub attributes: Map<String, Value>,
}

/// Project a snapshot at local time-of-day `now`
#[must_use]
pub fn project(data: &FeedData, now: NaiveTime) -> Projection {
    Projection {
        value: state_value(data, now),
        attributes: state_attributes(data),
    }
}

/// Numeric state of a snapshot.
///
/// Empty data is 0 for every feed. Fleets and announcements count items.
/// Arrivals take the smallest known ETA; schedules the fewest minutes until a
/// departure, wrapping past midnight. Either is unknown when no item yields a
/// value.
#[must_use]
pub fn state_value(data: &FeedData, now: NaiveTime) -> Option<u32> {
    if data.is_empty() {
        return Some(0);
    }

    match data {
        FeedData::AllFleet(buses) | FeedData::RouteFleet(buses) => Some(count(buses.len())),
        FeedData::StopArrivals(arrivals) => arrivals.iter().filter_map(|a| a.eta_minutes).min(),
        FeedData::RouteSchedule(departures) => departures
            .iter()
            .filter_map(|d| d.minutes_until(now))
            .min(),
        FeedData::RouteAnnouncements(items) => Some(count(items.len())),
    }
}

/// Attributes of a snapshot: `feed_type`, the items under the feed's plural
/// key, and `count`
#[must_use]
pub fn state_attributes(data: &FeedData) -> Map<String, Value> {
    let kind = data.kind();
    let items = data.item_maps().into_iter().map(Value::Object).collect();

    let mut attributes = Map::new();
    attributes.insert("feed_type".to_string(), Value::from(kind.key()));
    attributes.insert(kind.data_key().to_string(), Value::Array(items));
    attributes.insert("count".to_string(), Value::from(data.len()));
    attributes
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Serialisable view of a sensor at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    pub available: bool,
    pub state: Option<u32>,
    pub attributes: Map<String, Value>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// The sensor entity of one config entry
#[derive(Debug, Clone)]
pub struct IettSensor {
    unique_id: String,
    name: String,
    coordinator: Arc<FeedCoordinator>,
}

impl IettSensor {
    /// Create the sensor for `entry`, reading from `coordinator`
    #[must_use]
    pub fn new(coordinator: Arc<FeedCoordinator>, entry: &ConfigEntry) -> Self {
        Self {
            unique_id: entry
                .unique_id
                .clone()
                .unwrap_or_else(|| entry.entry_id.clone()),
            name: entry.title.clone(),
            coordinator,
        }
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FeedKind {
        self.coordinator.kind()
    }

    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.kind().icon()
    }

    #[must_use]
    pub fn unit(&self) -> Option<&'static str> {
        self.kind().unit()
    }

    /// Whether the coordinator's last refresh succeeded
    #[must_use]
    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    /// State at the current local time
    #[must_use]
    pub fn native_value(&self) -> Option<u32> {
        self.native_value_at(Local::now().time())
    }

    #[must_use]
    pub fn native_value_at(&self, now: NaiveTime) -> Option<u32> {
        state_value(&self.snapshot(), now)
    }

    #[must_use]
    pub fn extra_state_attributes(&self) -> Map<String, Value> {
        state_attributes(&self.snapshot())
    }

    /// Full state at the current local time
    #[must_use]
    pub fn state(&self) -> SensorState {
        self.state_at(Local::now().time())
    }

    #[must_use]
    pub fn state_at(&self, now: NaiveTime) -> SensorState {
        let projection = project(&self.snapshot(), now);
        SensorState {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            icon: self.icon(),
            unit: self.unit(),
            available: self.available(),
            state: projection.value,
            attributes: projection.attributes,
            last_updated: self.coordinator.status().last_updated,
        }
    }

    // No data yet projects as an empty snapshot.
    fn snapshot(&self) -> Arc<FeedData> {
        self.coordinator
            .data()
            .unwrap_or_else(|| Arc::new(FeedData::empty(self.kind())))
    }
}
