//! Entry setup and teardown
//!
//! Mirrors the host lifecycle: an entry is set up once (coordinator created,
//! first refresh awaited, sensor platform loaded) and unloaded on removal.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::{EntryRegistry, FeedCoordinator, IettSensor};
use crate::config_entry::ConfigEntry;
use crate::error::ApplicationError;
use crate::ports::MiddleApiConnector;

/// Sets up and unloads config entries
pub struct IntegrationSetup {
    connector: Arc<dyn MiddleApiConnector>,
}

impl std::fmt::Debug for IntegrationSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationSetup")
            .field("connector", &"<MiddleApiConnector>")
            .finish()
    }
}

impl IntegrationSetup {
    #[must_use]
    pub fn new(connector: Arc<dyn MiddleApiConnector>) -> Self {
        Self { connector }
    }

    /// Set up `entry` and register it in `registry`.
    ///
    /// Nothing is registered unless the first refresh succeeds.
    ///
    /// # Errors
    ///
    /// `Domain` for an unknown feed type or missing parameter (before any
    /// request), `Configuration` for an unusable backend URL, and `NotReady`
    /// when the first refresh fails.
    #[instrument(skip(self, registry, entry), fields(entry_id = %entry.entry_id, title = %entry.title))]
    pub async fn setup_entry(
        &self,
        registry: &EntryRegistry,
        entry: &ConfigEntry,
    ) -> Result<Arc<FeedCoordinator>, ApplicationError> {
        let selector = entry.data.selector()?;
        let api = self.connector.connect(&entry.data.middle_url)?;
        let coordinator = Arc::new(FeedCoordinator::new(selector, api));

        coordinator.first_refresh().await.map_err(|e| match e {
            ApplicationError::NotReady { reason, source, .. } => ApplicationError::NotReady {
                entry: entry.title.clone(),
                reason,
                source,
            },
            other => other,
        })?;

        registry.insert(entry.clone(), Arc::clone(&coordinator));
        setup_sensor_platform(registry, entry)?;

        info!(feed = %coordinator.selector(), "Entry set up");
        Ok(coordinator)
    }

    /// Unload the platform entities of an entry and discard its coordinator
    ///
    /// Returns `false` if the entry was not loaded.
    #[instrument(skip(self, registry))]
    pub fn unload_entry(&self, registry: &EntryRegistry, entry_id: &str) -> bool {
        let sensors = registry.take_sensors(entry_id);
        debug!(count = sensors.len(), "Sensor entities unloaded");

        if registry.remove(entry_id).is_some() {
            info!("Entry unloaded");
            true
        } else {
            warn!("Entry was not loaded");
            false
        }
    }
}

/// Create the sensor entity of a registered entry
fn setup_sensor_platform(
    registry: &EntryRegistry,
    entry: &ConfigEntry,
) -> Result<(), ApplicationError> {
    let coordinator = registry.coordinator(&entry.entry_id).ok_or_else(|| {
        ApplicationError::Configuration(format!("entry {} is not loaded", entry.entry_id))
    })?;

    let sensor = Arc::new(IettSensor::new(coordinator, entry));
    debug!(unique_id = sensor.unique_id(), "Adding sensor entity");
    registry.add_sensors(&entry.entry_id, vec![sensor]);
    Ok(())
}
