//! iett-middle REST client
//!
//! Thin wrapper over the backend's `/v1` GET endpoints. Each call issues a
//! single request, decodes the JSON body into domain records and fails as a
//! whole on any error. The client holds no state beyond the HTTP session and
//! base URL, so it is cheap to clone and share.

use std::time::Duration;

use domain::{Announcement, Arrival, BusPosition, RouteCode, RouteStop, ScheduledDeparture, StopCode};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::MiddleConfig;
use crate::error::{ConfigurationError, IettMiddleError};

/// A JSON object relayed without a fixed schema
pub type JsonObject = Map<String, Value>;

/// REST client for the iett-middle v1 API
#[derive(Debug, Clone)]
pub struct IettMiddleClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    health_timeout: Duration,
}

impl IettMiddleClient {
    /// Create a client with its own HTTP session
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &MiddleConfig) -> Result<Self, ConfigurationError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigurationError::ClientInit(e.to_string()))?;

        Self::with_client(client, config)
    }

    /// Create a client on top of an existing HTTP session
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_client(client: Client, config: &MiddleConfig) -> Result<Self, ConfigurationError> {
        config.validate().map_err(ConfigurationError::Invalid)?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            timeout: Duration::from_secs(config.timeout_secs),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
        })
    }

    /// The backend this client talks to
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        // Cannot fail: parse_base_url rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url` and decode the body as `T`
    async fn get_json<T>(&self, url: Url) -> Result<T, IettMiddleError>
    where
        T: DeserializeOwned,
    {
        debug!(%url, "Requesting iett-middle");

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| IettMiddleError::new(&url, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| IettMiddleError::new(&url, e))?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!(%url, error = %e, "Undecodable iett-middle response");
            IettMiddleError::new(&url, e)
        })
    }

    // ── Fleet ──────────────────────────────────────────────────────────────

    /// All active Istanbul buses (several thousand)
    #[instrument(skip(self))]
    pub async fn get_all_buses(&self) -> Result<Vec<BusPosition>, IettMiddleError> {
        let buses: Vec<BusPosition> = self.get_json(self.endpoint(["v1", "fleet"])).await?;
        debug!(count = buses.len(), "Fleet received");
        Ok(buses)
    }

    /// Live positions of the buses running `route`
    #[instrument(skip(self), fields(route = %route))]
    pub async fn get_route_buses(
        &self,
        route: &RouteCode,
    ) -> Result<Vec<BusPosition>, IettMiddleError> {
        self.get_json(self.endpoint(["v1", "routes", route.as_str(), "buses"]))
            .await
    }

    // ── Stops ──────────────────────────────────────────────────────────────

    /// Real-time ETAs at `stop`, optionally only for buses that also pass `via`
    #[instrument(skip(self), fields(stop = %stop))]
    pub async fn get_stop_arrivals(
        &self,
        stop: &StopCode,
        via: Option<&StopCode>,
    ) -> Result<Vec<Arrival>, IettMiddleError> {
        let mut url = self.endpoint(["v1", "stops", stop.as_str(), "arrivals"]);
        if let Some(via) = via {
            url.query_pairs_mut().append_pair("via", via.as_str());
        }
        self.get_json(url).await
    }

    /// Descriptive record of a single stop
    #[instrument(skip(self), fields(stop = %stop))]
    pub async fn get_stop_detail(&self, stop: &StopCode) -> Result<JsonObject, IettMiddleError> {
        self.get_json(self.endpoint(["v1", "stops", stop.as_str()]))
            .await
    }

    /// Stops around a coordinate
    #[instrument(skip(self))]
    pub async fn get_nearby_stops(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<JsonObject>, IettMiddleError> {
        let mut url = self.endpoint(["v1", "stops", "nearby"]);
        url.query_pairs_mut()
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string());
        self.get_json(url).await
    }

    // ── Routes ─────────────────────────────────────────────────────────────

    /// Planned departure schedule for `route`
    #[instrument(skip(self), fields(route = %route))]
    pub async fn get_route_schedule(
        &self,
        route: &RouteCode,
    ) -> Result<Vec<ScheduledDeparture>, IettMiddleError> {
        self.get_json(self.endpoint(["v1", "routes", route.as_str(), "schedule"]))
            .await
    }

    /// Active service announcements and disruptions for `route`
    #[instrument(skip(self), fields(route = %route))]
    pub async fn get_announcements(
        &self,
        route: &RouteCode,
    ) -> Result<Vec<Announcement>, IettMiddleError> {
        self.get_json(self.endpoint(["v1", "routes", route.as_str(), "announcements"]))
            .await
    }

    /// Ordered stop list of `route`
    #[instrument(skip(self), fields(route = %route))]
    pub async fn get_route_stops(
        &self,
        route: &RouteCode,
    ) -> Result<Vec<RouteStop>, IettMiddleError> {
        self.get_json(self.endpoint(["v1", "routes", route.as_str(), "stops"]))
            .await
    }

    // ── Garages ────────────────────────────────────────────────────────────

    /// IETT garages
    #[instrument(skip(self))]
    pub async fn get_garages(&self) -> Result<Vec<JsonObject>, IettMiddleError> {
        self.get_json(self.endpoint(["v1", "garages"])).await
    }

    // ── Health ─────────────────────────────────────────────────────────────

    /// Check `/health`; healthy only on a 200 within the health timeout
    pub async fn is_healthy(&self) -> bool {
        let url = self.endpoint(["health"]);
        match self
            .client
            .get(url.clone())
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                debug!(%url, status = %response.status(), "Health check rejected");
                false
            },
            Err(e) => {
                debug!(%url, error = %e, "Health check failed");
                false
            },
        }
    }
}

/// Parse and check a configured base URL
fn parse_base_url(raw: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }

    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }

    Ok(url)
}
