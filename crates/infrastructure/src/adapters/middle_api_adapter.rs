//! iett-middle adapter - Implements MiddleApiPort using integration_iett

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{JsonObject, MiddleApiConnector, MiddleApiPort};
use async_trait::async_trait;
use domain::{Announcement, Arrival, BusPosition, RouteCode, RouteStop, ScheduledDeparture, StopCode};
use integration_iett::{ConfigurationError, IettMiddleClient, IettMiddleError, MiddleConfig};
use tracing::{debug, instrument};

/// Adapter for one iett-middle backend
#[derive(Debug, Clone)]
pub struct IettMiddleAdapter {
    client: IettMiddleClient,
}

impl IettMiddleAdapter {
    #[must_use]
    pub const fn new(client: IettMiddleClient) -> Self {
        Self { client }
    }

    /// Create an adapter with its own client
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid.
    pub fn from_config(config: &MiddleConfig) -> Result<Self, ApplicationError> {
        IettMiddleClient::new(config)
            .map(Self::new)
            .map_err(map_config_error)
    }

    /// The backend this adapter talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.client.base_url().as_str()
    }
}

fn map_error(error: IettMiddleError) -> ApplicationError {
    ApplicationError::backend(error)
}

fn map_config_error(error: ConfigurationError) -> ApplicationError {
    ApplicationError::Configuration(error.to_string())
}

#[async_trait]
impl MiddleApiPort for IettMiddleAdapter {
    #[instrument(skip(self))]
    async fn all_buses(&self) -> Result<Vec<BusPosition>, ApplicationError> {
        self.client.get_all_buses().await.map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn route_buses(&self, route: &RouteCode) -> Result<Vec<BusPosition>, ApplicationError> {
        self.client.get_route_buses(route).await.map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn stop_arrivals(
        &self,
        stop: &StopCode,
        via: Option<StopCode>,
    ) -> Result<Vec<Arrival>, ApplicationError> {
        self.client
            .get_stop_arrivals(stop, via.as_ref())
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn route_schedule(
        &self,
        route: &RouteCode,
    ) -> Result<Vec<ScheduledDeparture>, ApplicationError> {
        self.client.get_route_schedule(route).await.map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn announcements(
        &self,
        route: &RouteCode,
    ) -> Result<Vec<Announcement>, ApplicationError> {
        self.client.get_announcements(route).await.map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn route_stops(&self, route: &RouteCode) -> Result<Vec<RouteStop>, ApplicationError> {
        self.client.get_route_stops(route).await.map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn stop_detail(&self, stop: &StopCode) -> Result<JsonObject, ApplicationError> {
        self.client.get_stop_detail(stop).await.map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn nearby_stops(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<JsonObject>, ApplicationError> {
        self.client
            .get_nearby_stops(latitude, longitude)
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn garages(&self) -> Result<Vec<JsonObject>, ApplicationError> {
        self.client.get_garages().await.map_err(map_error)
    }

    async fn is_healthy(&self) -> bool {
        self.client.is_healthy().await
    }
}

/// Creates adapters for per-entry backend URLs, sharing one HTTP session
#[derive(Debug, Clone)]
pub struct IettMiddleConnector {
    http: reqwest::Client,
    template: MiddleConfig,
}

impl IettMiddleConnector {
    /// Create a connector; `template` supplies timeouts and user agent
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(template: MiddleConfig) -> Result<Self, ApplicationError> {
        let http = reqwest::Client::builder()
            .user_agent(template.user_agent.clone())
            .build()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

        Ok(Self { http, template })
    }
}

impl MiddleApiConnector for IettMiddleConnector {
    fn connect(&self, base_url: &str) -> Result<Arc<dyn MiddleApiPort>, ApplicationError> {
        let config = MiddleConfig {
            base_url: base_url.to_string(),
            ..self.template.clone()
        };
        let client =
            IettMiddleClient::with_client(self.http.clone(), &config).map_err(map_config_error)?;
        debug!(base_url = %client.base_url(), "Connected iett-middle adapter");
        Ok(Arc::new(IettMiddleAdapter::new(client)))
    }
}
