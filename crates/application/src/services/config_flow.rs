//! Setup wizard for new config entries
//!
//! Two steps: `user` asks for the backend URL and feed type and checks the
//! backend health; `params` asks for the route or stop the feed is bound to.
//! The all-fleet feed needs no parameters and skips the second step.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use domain::{DomainError, FeedKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config_entry::{ConfigEntry, DEFAULT_MIDDLE_URL, EntryData};
use crate::ports::MiddleApiConnector;

/// Error key shown on the whole form when the backend cannot be reached
pub const ERROR_CANNOT_CONNECT: &str = "cannot_connect";
/// Abort reason for an entry whose unique id is already configured
pub const ABORT_ALREADY_CONFIGURED: &str = "already_configured";

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    User,
    Params,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Params => f.write_str("params"),
        }
    }
}

/// One input field of a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Allowed values as `(key, label)` pairs, empty for free text
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<(&'static str, &'static str)>,
}

impl FormField {
    const fn text(name: &'static str, required: bool) -> Self {
        Self {
            name,
            required,
            default: None,
            options: Vec::new(),
        }
    }
}

/// Input of the `user` step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    #[serde(default = "default_middle_url")]
    pub middle_url: String,
    pub feed_type: String,
}

fn default_middle_url() -> String {
    DEFAULT_MIDDLE_URL.to_string()
}

/// Input of the `params` step
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParamsInput {
    #[serde(default)]
    pub hat_kodu: Option<String>,
    #[serde(default)]
    pub dcode: Option<String>,
    #[serde(default)]
    pub via: Option<String>,
}

/// What the wizard asks the host to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    /// Show (or re-show) a form; `errors` maps field name, or `base` for the
    /// whole form, to an error key
    Form {
        step: FlowStep,
        fields: Vec<FormField>,
        errors: BTreeMap<String, String>,
    },
    /// Persist this entry and set it up
    CreateEntry(ConfigEntry),
    /// Stop the wizard
    Abort { reason: String },
}

/// A running setup wizard
pub struct ConfigFlow {
    connector: Arc<dyn MiddleApiConnector>,
    configured: HashSet<String>,
    pending: Option<UserInput>,
}

impl fmt::Debug for ConfigFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigFlow")
            .field("connector", &"<MiddleApiConnector>")
            .field("configured", &self.configured)
            .field("pending", &self.pending)
            .finish()
    }
}

impl ConfigFlow {
    /// Start a wizard; `configured` holds the unique ids of existing entries
    pub fn new(
        connector: Arc<dyn MiddleApiConnector>,
        configured: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            connector,
            configured: configured.into_iter().collect(),
            pending: None,
        }
    }

    /// Step `user`: backend URL and feed type
    #[instrument(skip(self, input))]
    pub async fn step_user(&mut self, input: Option<UserInput>) -> FlowResult {
        let Some(input) = input else {
            return user_form(BTreeMap::new());
        };

        let mut errors = BTreeMap::new();
        let kind = match input.feed_type.parse::<FeedKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                errors.insert("feed_type".to_string(), "invalid_feed_type".to_string());
                None
            },
        };

        if !self.backend_healthy(&input.middle_url).await {
            errors.insert("base".to_string(), ERROR_CANNOT_CONNECT.to_string());
        }

        let Some(kind) = kind.filter(|_| errors.is_empty()) else {
            return user_form(errors);
        };

        self.pending = Some(input);
        if kind == FeedKind::AllFleet {
            return self.create_entry(ParamsInput::default());
        }
        params_form(kind, BTreeMap::new())
    }

    /// Step `params`: route or stop code
    #[instrument(skip(self, input))]
    pub fn step_params(&mut self, input: Option<ParamsInput>) -> FlowResult {
        let Some(kind) = self
            .pending
            .as_ref()
            .and_then(|pending| pending.feed_type.parse::<FeedKind>().ok())
        else {
            return FlowResult::Abort {
                reason: "user_step_missing".to_string(),
            };
        };

        match input {
            Some(params) => self.create_entry(params),
            None => params_form(kind, BTreeMap::new()),
        }
    }

    async fn backend_healthy(&self, middle_url: &str) -> bool {
        match self.connector.connect(middle_url) {
            Ok(api) => api.is_healthy().await,
            Err(e) => {
                debug!(error = %e, "Backend URL rejected");
                false
            },
        }
    }

    fn create_entry(&mut self, params: ParamsInput) -> FlowResult {
        let Some(user) = self.pending.as_ref() else {
            return FlowResult::Abort {
                reason: "user_step_missing".to_string(),
            };
        };

        let data = EntryData {
            middle_url: user.middle_url.clone(),
            feed_type: user.feed_type.clone(),
            hat_kodu: params.hat_kodu,
            dcode: params.dcode,
            via: params.via,
        };

        let entry = match ConfigEntry::from_data(data) {
            Ok(entry) => entry,
            Err(e) => {
                let kind = user.feed_type.parse().unwrap_or(FeedKind::AllFleet);
                return params_form(kind, param_errors(&e));
            },
        };

        let duplicate = entry
            .unique_id
            .as_ref()
            .is_some_and(|id| !self.configured.insert(id.clone()));
        if duplicate {
            info!(unique_id = ?entry.unique_id, "Entry already configured");
            return FlowResult::Abort {
                reason: ABORT_ALREADY_CONFIGURED.to_string(),
            };
        }

        info!(title = %entry.title, "Creating entry");
        FlowResult::CreateEntry(entry)
    }
}

fn user_form(errors: BTreeMap<String, String>) -> FlowResult {
    let feed_type = FormField {
        options: FeedKind::ALL
            .iter()
            .map(|kind| (kind.key(), kind.label()))
            .collect(),
        ..FormField::text("feed_type", true)
    };

    FlowResult::Form {
        step: FlowStep::User,
        fields: vec![
            FormField {
                default: Some(DEFAULT_MIDDLE_URL.to_string()),
                ..FormField::text("middle_url", true)
            },
            feed_type,
        ],
        errors,
    }
}

fn params_form(kind: FeedKind, errors: BTreeMap<String, String>) -> FlowResult {
    let fields = if kind.requires_route() {
        vec![FormField::text("hat_kodu", true)]
    } else if kind.requires_stop() {
        vec![FormField::text("dcode", true), FormField::text("via", false)]
    } else {
        Vec::new()
    };

    FlowResult::Form {
        step: FlowStep::Params,
        fields,
        errors,
    }
}

fn param_errors(error: &DomainError) -> BTreeMap<String, String> {
    let (field, key) = match error {
        DomainError::MissingParameter { parameter, .. } => ((*parameter).to_string(), "required"),
        DomainError::InvalidRouteCode(_) => ("hat_kodu".to_string(), "invalid_route_code"),
        DomainError::InvalidStopCode(_) => ("dcode".to_string(), "invalid_stop_code"),
        DomainError::UnknownFeedType(_) => ("feed_type".to_string(), "invalid_feed_type"),
        DomainError::ValidationError(_) => ("base".to_string(), "invalid"),
    };
    BTreeMap::from([(field, key.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApplicationError;
    use crate::ports::{MiddleApiPort, MockMiddleApiConnector, MockMiddleApiPort};

    fn connector(healthy: bool) -> Arc<dyn MiddleApiConnector> {
        let mut connector = MockMiddleApiConnector::new();
        connector.expect_connect().returning(move |_| {
            let mut port = MockMiddleApiPort::new();
            port.expect_is_healthy().returning(move || healthy);
            Ok(Arc::new(port) as Arc<dyn MiddleApiPort>)
        });
        Arc::new(connector)
    }

    fn user(feed_type: &str) -> UserInput {
        UserInput {
            middle_url: "http://iett-middle.test".to_string(),
            feed_type: feed_type.to_string(),
        }
    }

    fn created(result: FlowResult) -> ConfigEntry {
        match result {
            FlowResult::CreateEntry(entry) => entry,
            other => unreachable!("Expected CreateEntry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn initial_user_form() {
        let mut flow = ConfigFlow::new(connector(true), []);
        match flow.step_user(None).await {
            FlowResult::Form {
                step,
                fields,
                errors,
            } => {
                assert_eq!(step, FlowStep::User);
                assert_eq!(fields[0].default.as_deref(), Some(DEFAULT_MIDDLE_URL));
                assert_eq!(fields[1].options.len(), 5);
                assert!(errors.is_empty());
            },
            other => unreachable!("Expected form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unhealthy_backend_reshows_user_form() {
        let mut flow = ConfigFlow::new(connector(false), []);
        match flow.step_user(Some(user("all_fleet"))).await {
            FlowResult::Form { step, errors, .. } => {
                assert_eq!(step, FlowStep::User);
                assert_eq!(errors["base"], ERROR_CANNOT_CONNECT);
            },
            other => unreachable!("Expected form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_url_is_cannot_connect() {
        let mut connector = MockMiddleApiConnector::new();
        connector
            .expect_connect()
            .returning(|_| Err(ApplicationError::Configuration("relative URL".to_string())));
        let mut flow = ConfigFlow::new(Arc::new(connector), []);

        match flow.step_user(Some(user("all_fleet"))).await {
            FlowResult::Form { errors, .. } => assert_eq!(errors["base"], ERROR_CANNOT_CONNECT),
            other => unreachable!("Expected form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_fleet_creates_entry_immediately() {
        let mut flow = ConfigFlow::new(connector(true), []);
        let entry = created(flow.step_user(Some(user("all_fleet"))).await);

        assert_eq!(entry.title, "IETT — All Fleet (entire Istanbul)");
        assert_eq!(entry.unique_id.as_deref(), Some("all_fleet"));
        assert_eq!(entry.data.middle_url, "http://iett-middle.test");
    }

    #[tokio::test]
    async fn route_feed_asks_for_route_code() {
        let mut flow = ConfigFlow::new(connector(true), []);
        match flow.step_user(Some(user("route_fleet"))).await {
            FlowResult::Form { step, fields, .. } => {
                assert_eq!(step, FlowStep::Params);
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].name, "hat_kodu");
            },
            other => unreachable!("Expected params form, got {other:?}"),
        }

        let entry = created(
            flow.step_params(Some(ParamsInput {
                hat_kodu: Some("500t".to_string()),
                ..ParamsInput::default()
            })),
        );
        assert_eq!(entry.title, "IETT — 500T Route Fleet");
        assert_eq!(entry.unique_id.as_deref(), Some("route_fleet_500T"));
        assert_eq!(entry.data.hat_kodu.as_deref(), Some("500t"));
    }

    #[tokio::test]
    async fn stop_feed_asks_for_stop_and_via() {
        let mut flow = ConfigFlow::new(connector(true), []);
        flow.step_user(Some(user("stop_arrivals"))).await;

        match flow.step_params(None) {
            FlowResult::Form { fields, .. } => {
                let names: Vec<_> = fields.iter().map(|f| f.name).collect();
                assert_eq!(names, vec!["dcode", "via"]);
                assert!(!fields[1].required);
            },
            other => unreachable!("Expected params form, got {other:?}"),
        }

        let entry = created(
            flow.step_params(Some(ParamsInput {
                dcode: Some("220602".to_string()),
                via: Some("113333".to_string()),
                ..ParamsInput::default()
            })),
        );
        assert_eq!(entry.title, "IETT — Stop 220602 Arrivals");
        assert_eq!(entry.unique_id.as_deref(), Some("stop_arrivals_220602"));
    }

    #[tokio::test]
    async fn schedule_and_announcement_titles() {
        for (feed, title, unique_id) in [
            ("route_schedule", "IETT — 500T Route Schedule", "route_schedule_500T"),
            (
                "route_announcements",
                "IETT — 500T Route Announcements",
                "route_announcements_500T",
            ),
        ] {
            let mut flow = ConfigFlow::new(connector(true), []);
            flow.step_user(Some(user(feed))).await;
            let entry = created(
                flow.step_params(Some(ParamsInput {
                    hat_kodu: Some("500T".to_string()),
                    ..ParamsInput::default()
                })),
            );
            assert_eq!(entry.title, title);
            assert_eq!(entry.unique_id.as_deref(), Some(unique_id));
        }
    }

    #[tokio::test]
    async fn missing_parameter_reshows_params_form() {
        let mut flow = ConfigFlow::new(connector(true), []);
        flow.step_user(Some(user("route_schedule"))).await;

        match flow.step_params(Some(ParamsInput::default())) {
            FlowResult::Form { step, errors, .. } => {
                assert_eq!(step, FlowStep::Params);
                assert_eq!(errors["hat_kodu"], "required");
            },
            other => unreachable!("Expected params form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_entry_aborts() {
        let mut flow = ConfigFlow::new(connector(true), ["route_fleet_500T".to_string()]);
        flow.step_user(Some(user("route_fleet"))).await;

        let result = flow
            .step_params(Some(ParamsInput {
                hat_kodu: Some("500t".to_string()),
                ..ParamsInput::default()
            }));

        assert_eq!(
            result,
            FlowResult::Abort {
                reason: ABORT_ALREADY_CONFIGURED.to_string()
            }
        );
    }

    #[tokio::test]
    async fn unknown_feed_type_is_field_error() {
        let mut flow = ConfigFlow::new(connector(true), []);
        match flow.step_user(Some(user("unknown_feed"))).await {
            FlowResult::Form { step, errors, .. } => {
                assert_eq!(step, FlowStep::User);
                assert_eq!(errors["feed_type"], "invalid_feed_type");
                assert!(!errors.contains_key("base"));
            },
            other => unreachable!("Expected form, got {other:?}"),
        }
    }

    #[test]
    fn params_before_user_aborts() {
        let mut flow = ConfigFlow::new(connector(true), []);
        assert!(matches!(
            flow.step_params(None),
            FlowResult::Abort { .. }
        ));
    }
}
