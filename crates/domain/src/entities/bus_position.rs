//! Live bus position

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The line a bus is currently assigned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAffiliation {
    /// Line code, e.g. `500T`
    pub route_code: String,
    /// Full line name
    pub route_name: String,
    /// Direction label as reported by the backend
    pub direction: String,
}

/// A vehicle position from the fleet feeds.
///
/// Decoding fails unless `route_code`, `route_name` and `direction` are either
/// all present or all absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BusPositionRecord", into = "BusPositionRecord")]
pub struct BusPosition {
    /// Door number identifying the vehicle
    pub kapino: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Speed in km/h
    pub speed: u32,
    /// Last report time, in whatever format the backend relays
    pub last_seen: String,
    pub plate: Option<String>,
    pub operator: Option<String>,
    /// `None` while the bus is not running a line
    pub route: Option<RouteAffiliation>,
    /// Stop code closest to the vehicle
    pub nearest_stop: Option<String>,
}

impl BusPosition {
    /// Create an unaffiliated position
    pub fn new(
        kapino: impl Into<String>,
        latitude: f64,
        longitude: f64,
        speed: u32,
        last_seen: impl Into<String>,
    ) -> Self {
        Self {
            kapino: kapino.into(),
            latitude,
            longitude,
            speed,
            last_seen: last_seen.into(),
            plate: None,
            operator: None,
            route: None,
            nearest_stop: None,
        }
    }

    /// Attach the line the bus is running
    #[must_use]
    pub fn with_route(mut self, route: RouteAffiliation) -> Self {
        self.route = Some(route);
        self
    }

    /// Line code, if affiliated
    pub fn route_code(&self) -> Option<&str> {
        self.route.as_ref().map(|r| r.route_code.as_str())
    }
}

/// Flat wire shape of [`BusPosition`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BusPositionRecord {
    kapino: String,
    plate: Option<String>,
    latitude: f64,
    longitude: f64,
    speed: u32,
    operator: Option<String>,
    last_seen: String,
    route_code: Option<String>,
    route_name: Option<String>,
    direction: Option<String>,
    nearest_stop: Option<String>,
}

impl TryFrom<BusPositionRecord> for BusPosition {
    type Error = DomainError;

    fn try_from(record: BusPositionRecord) -> Result<Self, Self::Error> {
        let route = match (record.route_code, record.route_name, record.direction) {
            (Some(route_code), Some(route_name), Some(direction)) => Some(RouteAffiliation {
                route_code,
                route_name,
                direction,
            }),
            (None, None, None) => None,
            _ => {
                return Err(DomainError::ValidationError(format!(
                    "bus {}: route_code, route_name and direction must be set together",
                    record.kapino
                )));
            },
        };

        Ok(Self {
            kapino: record.kapino,
            latitude: record.latitude,
            longitude: record.longitude,
            speed: record.speed,
            last_seen: record.last_seen,
            plate: record.plate,
            operator: record.operator,
            route,
            nearest_stop: record.nearest_stop,
        })
    }
}

impl From<BusPosition> for BusPositionRecord {
    fn from(bus: BusPosition) -> Self {
        let (route_code, route_name, direction) = bus.route.map_or((None, None, None), |r| {
            (Some(r.route_code), Some(r.route_name), Some(r.direction))
        });

        Self {
            kapino: bus.kapino,
            plate: bus.plate,
            latitude: bus.latitude,
            longitude: bus.longitude,
            speed: bus.speed,
            operator: bus.operator,
            last_seen: bus.last_seen,
            route_code,
            route_name,
            direction,
            nearest_stop: bus.nearest_stop,
        }
    }
}
