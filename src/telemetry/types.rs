//! Snapshot payload types
//!
//! These mirror the upstream JSON field names, so they both deserialize the
//! upstream responses and serialize the wire payload pushed to clients.

use serde::{Deserialize, Serialize};

/// One driver entry from the upstream `drivers` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Car number (e.g. 1, 44)
    pub driver_number: u32,
    /// Team colour as a hex string (e.g. "3671C6")
    pub team_colour: String,
    /// Three-letter acronym (e.g. "VER")
    pub name_acronym: String,
    /// Full driver name
    pub full_name: String,
    /// Team name
    pub team_name: String,
}

/// Session metadata from the upstream `sessions` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Short circuit name (e.g. "Monza")
    pub circuit_short_name: String,
    /// Session start time, passed through as the upstream ISO-8601 string
    pub date_start: String,
    /// Circuit location (e.g. "Monza")
    pub location: String,
    /// Session name (e.g. "Practice 1")
    pub session_name: String,
    /// Session type (e.g. "Practice", "Race")
    pub session_type: String,
}

/// One immutable telemetry snapshot, assembled per poll cycle
///
/// Serializes to the wire payload pushed to every client:
/// `{ "drivers": [...], "session": {...} }`. Not retained after broadcast;
/// each snapshot fully replaces the prior one in client views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Drivers in the session, upstream order preserved
    pub drivers: Vec<DriverInfo>,
    /// Session metadata
    pub session: SessionInfo,
}

impl Snapshot {
    /// Create a snapshot from its parts
    pub fn new(drivers: Vec<DriverInfo>, session: SessionInfo) -> Self {
        Self { drivers, session }
    }

    /// Serialize to the JSON wire payload
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> SessionInfo {
        SessionInfo {
            circuit_short_name: "Monza".into(),
            date_start: "2025-09-05T12:30:00+00:00".into(),
            location: "Monza".into(),
            session_name: "Practice 1".into(),
            session_type: "Practice".into(),
        }
    }

    fn sample_driver() -> DriverInfo {
        DriverInfo {
            driver_number: 1,
            team_colour: "3671C6".into(),
            name_acronym: "VER".into(),
            full_name: "Max Verstappen".into(),
            team_name: "Red Bull Racing".into(),
        }
    }

    #[test]
    fn test_wire_payload_shape() {
        let snapshot = Snapshot::new(vec![sample_driver()], sample_session());
        let wire = snapshot.to_wire().unwrap();

        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["drivers"][0]["driver_number"], 1);
        assert_eq!(value["drivers"][0]["name_acronym"], "VER");
        assert_eq!(value["session"]["session_name"], "Practice 1");
    }

    #[test]
    fn test_deserialize_upstream_array() {
        // The upstream endpoints return JSON arrays
        let body = r#"[{
            "circuit_short_name": "Monza",
            "date_start": "2025-09-05T12:30:00+00:00",
            "location": "Monza",
            "session_name": "Practice 1",
            "session_type": "Practice",
            "session_key": 9999,
            "year": 2025
        }]"#;

        // Unknown upstream fields are ignored
        let sessions: Vec<SessionInfo> = serde_json::from_str(body).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0], sample_session());
    }

    #[test]
    fn test_empty_driver_list_serializes() {
        let snapshot = Snapshot::new(Vec::new(), sample_session());
        let wire = snapshot.to_wire().unwrap();

        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert!(value["drivers"].as_array().unwrap().is_empty());
    }
}
