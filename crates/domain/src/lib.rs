//! Domain layer for the IETT feed integration
//!
//! Typed records mirroring the iett-middle REST responses, the feed selector
//! that decides what a coordinator polls, and the domain errors raised while
//! building them. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
