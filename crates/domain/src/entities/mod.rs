//! Entities - Records returned by the iett-middle backend

mod announcement;
mod arrival;
mod bus_position;
mod feed_data;
mod route_stop;
mod scheduled_departure;

pub use announcement::Announcement;
pub use arrival::Arrival;
pub use bus_position::{BusPosition, RouteAffiliation};
pub use feed_data::FeedData;
pub use route_stop::RouteStop;
pub use scheduled_departure::ScheduledDeparture;

use serde::Serialize;
use serde_json::{Map, Value};

/// A backend record that can be flattened into a JSON object.
///
/// The object carries exactly the record's wire fields, absent optionals as
/// `null`.
pub trait Record: Serialize {
    /// The record as a plain JSON object
    fn as_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl Record for BusPosition {}
impl Record for Arrival {}
impl Record for ScheduledDeparture {}
impl Record for Announcement {}
impl Record for RouteStop {}
