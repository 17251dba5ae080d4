//! Stop along a route

use serde::{Deserialize, Serialize};

/// One stop of a line's stop sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteStop {
    pub route_code: String,
    pub direction: String,
    /// Position along the route, starting at 1
    pub sequence: u32,
    pub stop_code: String,
    pub stop_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub district: Option<String>,
}
