//! Stop arrival prediction

use serde::{Deserialize, Serialize};

/// A predicted arrival at a stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Arrival {
    pub route_code: String,
    pub destination: String,
    /// ETA text as shown by IETT, e.g. `(00:10) 4 dk`
    pub eta_raw: String,
    /// Parsed ETA; unsigned, so a negative value fails decoding
    #[serde(default)]
    pub eta_minutes: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_arrival() {
        let json = r#"{
            "route_code": "500T",
            "destination": "4.LEVENT METRO - ŞİFA SONDURAK",
            "eta_minutes": 4,
            "eta_raw": "(00:10) 4 dk"
        }"#;
        let arrival: Arrival = serde_json::from_str(json).unwrap();
        assert_eq!(arrival.eta_minutes, Some(4));
        assert_eq!(arrival.eta_raw, "(00:10) 4 dk");
    }

    #[test]
    fn eta_may_be_null_or_missing() {
        let null: Arrival = serde_json::from_str(
            r#"{"route_code": "14M", "destination": "X", "eta_raw": "?", "eta_minutes": null}"#,
        )
        .unwrap();
        let missing: Arrival =
            serde_json::from_str(r#"{"route_code": "14M", "destination": "X", "eta_raw": "?"}"#)
                .unwrap();
        assert_eq!(null, missing);
        assert!(null.eta_minutes.is_none());
    }

    #[test]
    fn negative_eta_is_rejected() {
        let json = r#"{"route_code": "14M", "destination": "X", "eta_raw": "?", "eta_minutes": -3}"#;
        assert!(serde_json::from_str::<Arrival>(json).is_err());
    }
}
