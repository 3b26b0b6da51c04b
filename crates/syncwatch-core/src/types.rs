//! Value types shared by the client, collector and metric sink.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One raw `Application` document as returned by the controller API.
///
/// Kept as untyped JSON so a single malformed record never fails the
/// decoding of the whole listing.
pub type RawAppRecord = serde_json::Value;

/// One monitored controller instance.
///
/// Serialized as `{"server": ..., "token": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Base URL of the controller API, as configured.
    #[serde(rename = "server")]
    pub endpoint: String,
    /// Pre-issued bearer token.
    #[serde(rename = "token")]
    pub credential: String,
}

impl TargetDescriptor {
    pub fn new(endpoint: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: credential.into(),
        }
    }

    /// URL of the application listing endpoint for this target.
    pub fn applications_url(&self) -> String {
        format!("{}/api/v1/applications", self.endpoint.trim_end_matches('/'))
    }
}

impl fmt::Debug for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetDescriptor")
            .field("endpoint", &self.endpoint)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Flattened facts about one application, ready to become metric labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppObservation {
    /// Endpoint of the controller that reported the application.
    pub target: String,
    pub name: String,
    pub project: String,
    pub namespace: String,
    /// Destination cluster (server URL or cluster alias).
    pub cluster: String,
    pub health_status: String,
    pub sync_status: String,
}

impl AppObservation {
    pub fn is_healthy(&self) -> bool {
        self.health_status == HEALTHY
    }

    pub fn is_synced(&self) -> bool {
        self.sync_status == SYNCED
    }
}

/// Health status string that maps to a gauge value of 1.
pub const HEALTHY: &str = "Healthy";

/// Sync status string that maps to a gauge value of 1.
pub const SYNCED: &str = "Synced";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applications_url_strips_trailing_slash() {
        let t = TargetDescriptor::new("https://ctrl.example.com/", "t");
        assert_eq!(
            t.applications_url(),
            "https://ctrl.example.com/api/v1/applications"
        );

        let t = TargetDescriptor::new("https://ctrl.example.com", "t");
        assert_eq!(
            t.applications_url(),
            "https://ctrl.example.com/api/v1/applications"
        );
    }

    #[test]
    fn debug_hides_credential() {
        let t = TargetDescriptor::new("https://ctrl.example.com", "s3cr3t");
        let printed = format!("{t:?}");
        assert!(printed.contains("ctrl.example.com"));
        assert!(!printed.contains("s3cr3t"));
    }

    #[test]
    fn target_uses_server_and_token_keys() {
        let t: TargetDescriptor =
            serde_json::from_str(r#"{"server":"https://a","token":"x"}"#).unwrap();
        assert_eq!(t.endpoint, "https://a");
        assert_eq!(t.credential, "x");
    }
}
