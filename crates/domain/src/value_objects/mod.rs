//! Value Objects - Immutable, identity-less domain primitives

mod feed_kind;
mod feed_selector;
mod route_code;
mod stop_code;

pub use feed_kind::FeedKind;
pub use feed_selector::FeedSelector;
pub use route_code::RouteCode;
pub use stop_code::StopCode;
