//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod middle_api_port;

#[cfg(test)]
pub use middle_api_port::{MockMiddleApiConnector, MockMiddleApiPort};
pub use middle_api_port::{JsonObject, MiddleApiConnector, MiddleApiPort};
