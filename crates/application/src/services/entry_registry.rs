//! Registry of loaded config entries
//!
//! Host-owned map from entry id to the live coordinator and the sensor
//! entities created for it. Setup inserts, teardown removes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{FeedCoordinator, IettSensor};
use crate::config_entry::ConfigEntry;

/// One set-up entry
#[derive(Debug, Clone)]
pub struct LoadedEntry {
    pub entry: ConfigEntry,
    pub coordinator: Arc<FeedCoordinator>,
    pub sensors: Vec<Arc<IettSensor>>,
}

/// Loaded entries keyed by entry id
#[derive(Debug, Default)]
pub struct EntryRegistry {
    entries: RwLock<HashMap<String, LoadedEntry>>,
}

impl EntryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the coordinator of a freshly set-up entry
    ///
    /// Replaces anything previously loaded under the same entry id.
    pub fn insert(&self, entry: ConfigEntry, coordinator: Arc<FeedCoordinator>) {
        let id = entry.entry_id.clone();
        self.entries.write().insert(
            id,
            LoadedEntry {
                entry,
                coordinator,
                sensors: Vec::new(),
            },
        );
    }

    /// Attach sensor entities to a loaded entry; `false` if it is not loaded
    pub fn add_sensors(&self, entry_id: &str, sensors: Vec<Arc<IettSensor>>) -> bool {
        let mut entries = self.entries.write();
        let Some(loaded) = entries.get_mut(entry_id) else {
            return false;
        };
        loaded.sensors.extend(sensors);
        true
    }

    /// Detach all sensor entities of an entry, returning them
    pub fn take_sensors(&self, entry_id: &str) -> Vec<Arc<IettSensor>> {
        self.entries
            .write()
            .get_mut(entry_id)
            .map(|loaded| std::mem::take(&mut loaded.sensors))
            .unwrap_or_default()
    }

    /// Discard an entry
    pub fn remove(&self, entry_id: &str) -> Option<LoadedEntry> {
        self.entries.write().remove(entry_id)
    }

    #[must_use]
    pub fn get(&self, entry_id: &str) -> Option<LoadedEntry> {
        self.entries.read().get(entry_id).cloned()
    }

    #[must_use]
    pub fn coordinator(&self, entry_id: &str) -> Option<Arc<FeedCoordinator>> {
        self.entries
            .read()
            .get(entry_id)
            .map(|loaded| Arc::clone(&loaded.coordinator))
    }

    #[must_use]
    pub fn sensors(&self, entry_id: &str) -> Vec<Arc<IettSensor>> {
        self.entries
            .read()
            .get(entry_id)
            .map(|loaded| loaded.sensors.clone())
            .unwrap_or_default()
    }

    /// Sensors of every loaded entry
    #[must_use]
    pub fn all_sensors(&self) -> Vec<Arc<IettSensor>> {
        self.entries
            .read()
            .values()
            .flat_map(|loaded| loaded.sensors.iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn contains(&self, entry_id: &str) -> bool {
        self.entries.read().contains_key(entry_id)
    }

    /// Whether a loaded entry already carries `unique_id`
    #[must_use]
    pub fn contains_unique_id(&self, unique_id: &str) -> bool {
        self.entries
            .read()
            .values()
            .any(|loaded| loaded.entry.unique_id.as_deref() == Some(unique_id))
    }

    #[must_use]
    pub fn entries(&self) -> Vec<ConfigEntry> {
        self.entries
            .read()
            .values()
            .map(|loaded| loaded.entry.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
