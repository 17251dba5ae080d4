//! Integration host
//!
//! Owns the entry registry, the setup service and the refresh scheduler, and
//! wires them together: an entry is set up, then scheduled; removal stops the
//! schedule before unloading.

use std::sync::Arc;

use application::{
    ApplicationError, ConfigEntry, ConfigFlow, EntryRegistry, FeedCoordinator, IntegrationSetup,
    MiddleApiConnector, SensorState,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::adapters::IettMiddleConnector;
use crate::config::AppConfig;
use crate::scheduler::{FeedEvent, FeedScheduler, SchedulerConfig, SchedulerError};

/// Host errors
#[derive(Debug, Error)]
pub enum HostError {
    /// Another loaded entry already carries the entry id or unique id
    #[error("Entry already configured: {0}")]
    AlreadyConfigured(String),

    /// No loaded entry with the id
    #[error("Entry not loaded: {0}")]
    NotLoaded(String),

    /// Setup failed
    #[error(transparent)]
    Setup(#[from] ApplicationError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Runs config entries
pub struct Host {
    registry: Arc<EntryRegistry>,
    setup: IntegrationSetup,
    scheduler: FeedScheduler,
    connector: Arc<dyn MiddleApiConnector>,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("registry", &self.registry)
            .field("scheduler", &self.scheduler)
            .field("connector", &"<MiddleApiConnector>")
            .finish_non_exhaustive()
    }
}

impl Host {
    #[must_use]
    pub fn new(connector: Arc<dyn MiddleApiConnector>, scheduler: &SchedulerConfig) -> Self {
        Self {
            registry: Arc::new(EntryRegistry::new()),
            setup: IntegrationSetup::new(Arc::clone(&connector)),
            scheduler: FeedScheduler::new(scheduler),
            connector,
        }
    }

    /// Create a host talking to iett-middle over HTTP
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn from_config(config: &AppConfig) -> Result<Self, HostError> {
        let connector = IettMiddleConnector::new(config.middle.clone())?;
        Ok(Self::new(Arc::new(connector), &config.scheduler))
    }

    /// The registry of loaded entries
    #[must_use]
    pub fn registry(&self) -> Arc<EntryRegistry> {
        Arc::clone(&self.registry)
    }

    /// Set up `entry` and start refreshing it
    ///
    /// # Errors
    ///
    /// Fails if an entry with the same entry id or unique id is loaded, or
    /// setup fails.
    #[instrument(skip(self, entry), fields(entry_id = %entry.entry_id, title = %entry.title))]
    pub async fn add_entry(
        &self,
        entry: ConfigEntry,
    ) -> Result<Arc<FeedCoordinator>, HostError> {
        if self.registry.contains(&entry.entry_id) {
            return Err(HostError::AlreadyConfigured(entry.entry_id));
        }
        if let Some(unique_id) = entry
            .unique_id
            .as_deref()
            .filter(|id| self.registry.contains_unique_id(id))
        {
            return Err(HostError::AlreadyConfigured(unique_id.to_string()));
        }

        let coordinator = self.setup.setup_entry(&self.registry, &entry).await?;
        if let Err(e) = self
            .scheduler
            .schedule(&entry.entry_id, Arc::clone(&coordinator))
        {
            self.setup.unload_entry(&self.registry, &entry.entry_id);
            return Err(e.into());
        }
        Ok(coordinator)
    }

    /// Set up every entry, logging the ones that fail
    ///
    /// Returns how many entries were loaded.
    pub async fn add_entries(&self, entries: impl IntoIterator<Item = ConfigEntry>) -> usize {
        let mut loaded = 0;
        for entry in entries {
            let title = entry.title.clone();
            match self.add_entry(entry).await {
                Ok(_) => loaded += 1,
                Err(e) => warn!(%title, error = %e, "Entry not loaded"),
            }
        }
        info!(loaded, total = self.registry.len(), "Entries loaded");
        loaded
    }

    /// Stop refreshing and unload an entry
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not loaded.
    #[instrument(skip(self))]
    pub fn remove_entry(&self, entry_id: &str) -> Result<(), HostError> {
        if let Err(e) = self.scheduler.stop(entry_id) {
            warn!(error = %e, "No refresh task to stop");
        }
        if self.setup.unload_entry(&self.registry, entry_id) {
            Ok(())
        } else {
            Err(HostError::NotLoaded(entry_id.to_string()))
        }
    }

    #[must_use]
    pub fn entries(&self) -> Vec<ConfigEntry> {
        self.registry.entries()
    }

    /// Current state of every sensor entity
    #[must_use]
    pub fn sensor_states(&self) -> Vec<SensorState> {
        let mut states: Vec<_> = self
            .registry
            .all_sensors()
            .iter()
            .map(|sensor| sensor.state())
            .collect();
        states.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        states
    }

    /// Start a setup wizard aware of the loaded entries
    #[must_use]
    pub fn config_flow(&self) -> ConfigFlow {
        let configured = self
            .registry
            .entries()
            .into_iter()
            .filter_map(|entry| entry.unique_id);
        ConfigFlow::new(Arc::clone(&self.connector), configured)
    }

    /// Refresh outcomes; only the first call gets the receiver
    pub fn take_event_receiver(&self) -> Option<mpsc::Receiver<FeedEvent>> {
        self.scheduler.take_event_receiver()
    }

    /// Stop all refreshes and unload every entry
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        for entry in self.registry.entries() {
            self.setup.unload_entry(&self.registry, &entry.entry_id);
        }
        info!("Host stopped");
    }
}
