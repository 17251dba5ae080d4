//! Service announcement

use serde::{Deserialize, Serialize};

/// A disruption or service notice for a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Announcement {
    pub route_code: String,
    pub route_name: String,
    /// Category label, e.g. `Günlük`
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_at: String,
    pub message: String,
}
