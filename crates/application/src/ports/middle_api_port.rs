//! iett-middle backend port
//!
//! Defines the interface the coordinator and setup flow use to reach the
//! iett-middle REST backend. The infrastructure layer implements it on top of
//! the `integration_iett` client.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{Announcement, Arrival, BusPosition, RouteCode, RouteStop, ScheduledDeparture, StopCode};
#[cfg(test)]
use mockall::automock;
use serde_json::{Map, Value};

use crate::error::ApplicationError;

/// A loosely typed JSON object relayed from the backend
pub type JsonObject = Map<String, Value>;

/// Port for the iett-middle REST backend bound to one base URL
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MiddleApiPort: Send + Sync {
    /// Every active bus
    async fn all_buses(&self) -> Result<Vec<BusPosition>, ApplicationError>;

    /// Buses currently running `route`
    async fn route_buses(&self, route: &RouteCode) -> Result<Vec<BusPosition>, ApplicationError>;

    /// Real-time ETAs at `stop`, filtered to buses passing `via` if given
    async fn stop_arrivals(
        &self,
        stop: &StopCode,
        via: Option<StopCode>,
    ) -> Result<Vec<Arrival>, ApplicationError>;

    /// Planned departures of `route`
    async fn route_schedule(
        &self,
        route: &RouteCode,
    ) -> Result<Vec<ScheduledDeparture>, ApplicationError>;

    /// Active announcements for `route`
    async fn announcements(&self, route: &RouteCode)
    -> Result<Vec<Announcement>, ApplicationError>;

    /// Ordered stop list of `route`
    async fn route_stops(&self, route: &RouteCode) -> Result<Vec<RouteStop>, ApplicationError>;

    /// Descriptive record of a stop
    async fn stop_detail(&self, stop: &StopCode) -> Result<JsonObject, ApplicationError>;

    /// Stops around a coordinate
    async fn nearby_stops(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<JsonObject>, ApplicationError>;

    /// IETT garages
    async fn garages(&self) -> Result<Vec<JsonObject>, ApplicationError>;

    /// Whether the backend answers its health check
    async fn is_healthy(&self) -> bool;
}

/// Factory binding a [`MiddleApiPort`] to a backend URL
///
/// Config entries carry their own backend URL, so ports are created per entry
/// rather than once per process.
#[cfg_attr(test, automock)]
pub trait MiddleApiConnector: Send + Sync {
    /// Create a port for the backend at `base_url`
    ///
    /// No request is made; an unusable URL is a configuration error.
    fn connect(&self, base_url: &str) -> Result<Arc<dyn MiddleApiPort>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn MiddleApiPort, _: &dyn MiddleApiConnector) {}

    #[test]
    fn traits_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn MiddleApiPort>();
        assert_send_sync::<dyn MiddleApiConnector>();
    }

    #[tokio::test]
    async fn mock_port_returns_configured_buses() {
        let mut mock = MockMiddleApiPort::new();
        mock.expect_all_buses()
            .returning(|| Ok(vec![BusPosition::new("A-001", 41.0, 29.0, 0, "00:00:00")]));

        let buses = mock.all_buses().await.unwrap();
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].kapino, "A-001");
    }

    #[tokio::test]
    async fn mock_connector_hands_out_port() {
        let mut connector = MockMiddleApiConnector::new();
        connector
            .expect_connect()
            .times(1)
            .returning(|url| {
                assert_eq!(url, "http://iett-middle.test");
                let mut port = MockMiddleApiPort::new();
                port.expect_is_healthy().returning(|| true);
                Ok(Arc::new(port) as Arc<dyn MiddleApiPort>)
            });

        let port = connector.connect("http://iett-middle.test").unwrap();
        assert!(port.is_healthy().await);
    }
}
