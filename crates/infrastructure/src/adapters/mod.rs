//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod middle_api_adapter;

pub use middle_api_adapter::{IettMiddleAdapter, IettMiddleConnector};
