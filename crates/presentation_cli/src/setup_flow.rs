//! Non-interactive driver for the setup wizard

use std::sync::Arc;

use anyhow::bail;
use application::{
    ConfigEntry, ConfigFlow, FlowResult, FlowStep, MiddleApiConnector, ParamsInput, UserInput,
};

use crate::{FeedArgs, entry_data};

/// Feed the command-line arguments through the wizard
///
/// Fails with the form errors if the wizard re-shows a form, or with the
/// abort reason if it aborts.
pub async fn create_entry(
    connector: Arc<dyn MiddleApiConnector>,
    configured: impl IntoIterator<Item = String>,
    args: &FeedArgs,
    default_url: &str,
) -> anyhow::Result<ConfigEntry> {
    let data = entry_data(args, default_url);
    let mut flow = ConfigFlow::new(connector, configured);

    let mut result = flow
        .step_user(Some(UserInput {
            middle_url: data.middle_url,
            feed_type: data.feed_type,
        }))
        .await;

    let needs_params = matches!(
        &result,
        FlowResult::Form { step: FlowStep::Params, errors, .. } if errors.is_empty()
    );
    if needs_params {
        result = flow.step_params(Some(ParamsInput {
            hat_kodu: data.hat_kodu,
            dcode: data.dcode,
            via: data.via,
        }));
    }

    match result {
        FlowResult::CreateEntry(entry) => Ok(entry),
        FlowResult::Form { step, errors, .. } => {
            let errors: Vec<_> = errors
                .iter()
                .map(|(field, error)| format!("{field}: {error}"))
                .collect();
            bail!("setup step {step} rejected the input ({})", errors.join(", "))
        },
        FlowResult::Abort { reason } => bail!("setup aborted: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use application::{ApplicationError, JsonObject, MiddleApiPort};
    use async_trait::async_trait;
    use domain::{
        Announcement, Arrival, BusPosition, RouteCode, RouteStop, ScheduledDeparture, StopCode,
    };

    use super::*;

    /// Backend that only answers the health check
    struct Health(bool);

    #[async_trait]
    impl MiddleApiPort for Health {
        async fn all_buses(&self) -> Result<Vec<BusPosition>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn route_buses(&self, _: &RouteCode) -> Result<Vec<BusPosition>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn stop_arrivals(
            &self,
            _: &StopCode,
            _: Option<StopCode>,
        ) -> Result<Vec<Arrival>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn route_schedule(
            &self,
            _: &RouteCode,
        ) -> Result<Vec<ScheduledDeparture>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn announcements(&self, _: &RouteCode) -> Result<Vec<Announcement>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn route_stops(&self, _: &RouteCode) -> Result<Vec<RouteStop>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn stop_detail(&self, _: &StopCode) -> Result<JsonObject, ApplicationError> {
            Ok(JsonObject::new())
        }
        async fn nearby_stops(&self, _: f64, _: f64) -> Result<Vec<JsonObject>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn garages(&self) -> Result<Vec<JsonObject>, ApplicationError> {
            Ok(Vec::new())
        }
        async fn is_healthy(&self) -> bool {
            self.0
        }
    }

    struct Connector(bool);

    impl MiddleApiConnector for Connector {
        fn connect(&self, _: &str) -> Result<Arc<dyn MiddleApiPort>, ApplicationError> {
            Ok(Arc::new(Health(self.0)))
        }
    }

    fn args(feed: &str, route: Option<&str>, stop: Option<&str>) -> FeedArgs {
        FeedArgs {
            url: None,
            feed: feed.to_string(),
            route: route.map(str::to_string),
            stop: stop.map(str::to_string),
            via: None,
        }
    }

    #[tokio::test]
    async fn route_feed_goes_through_params() {
        let entry = create_entry(
            Arc::new(Connector(true)),
            [],
            &args("route_fleet", Some("500T"), None),
            "http://iett-middle.test",
        )
        .await
        .unwrap();

        assert_eq!(entry.unique_id.as_deref(), Some("route_fleet_500T"));
        assert_eq!(entry.data.middle_url, "http://iett-middle.test");
    }

    #[tokio::test]
    async fn all_fleet_ignores_params() {
        let entry = create_entry(
            Arc::new(Connector(true)),
            [],
            &args("all_fleet", Some("500T"), None),
            "http://iett-middle.test",
        )
        .await
        .unwrap();

        assert_eq!(entry.unique_id.as_deref(), Some("all_fleet"));
        assert!(entry.data.hat_kodu.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_reports_cannot_connect() {
        let err = create_entry(
            Arc::new(Connector(false)),
            [],
            &args("all_fleet", None, None),
            "http://iett-middle.test",
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("base: cannot_connect"));
    }

    #[tokio::test]
    async fn missing_stop_is_rejected() {
        let err = create_entry(
            Arc::new(Connector(true)),
            [],
            &args("stop_arrivals", None, None),
            "http://iett-middle.test",
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("dcode"));
    }

    #[tokio::test]
    async fn duplicate_aborts() {
        let err = create_entry(
            Arc::new(Connector(true)),
            ["stop_arrivals_220602".to_string()],
            &args("stop_arrivals", None, Some("220602")),
            "http://iett-middle.test",
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "setup aborted: already_configured");
    }
}
