//! Application services - Use case implementations

mod config_flow;
mod entry_registry;
mod feed_coordinator;
mod integration_setup;
mod sensor;

pub use config_flow::{
    ABORT_ALREADY_CONFIGURED, ConfigFlow, ERROR_CANNOT_CONNECT, FlowResult, FlowStep, FormField,
    ParamsInput, UserInput,
};
pub use entry_registry::{EntryRegistry, LoadedEntry};
pub use feed_coordinator::{FeedCoordinator, RefreshStatus};
pub use integration_setup::IntegrationSetup;
pub use sensor::{IettSensor, Projection, SensorState, project, state_attributes, state_value};
