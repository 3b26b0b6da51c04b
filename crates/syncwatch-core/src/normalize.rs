//! Application record normalizer.
//!
//! Flattens one controller `Application` document into an
//! [`AppObservation`]. The function is total: missing or mistyped fields
//! fall back to fixed defaults instead of failing the batch.

use serde_json::Value;

use crate::types::{AppObservation, RawAppRecord};

const UNKNOWN: &str = "unknown";
const DEFAULT_PROJECT: &str = "default";
const UNKNOWN_STATUS: &str = "Unknown";

/// Normalize a raw record reported by `target`.
pub fn normalize(target: &str, raw: &RawAppRecord) -> AppObservation {
    let name = str_at(raw, &["metadata", "name"]).unwrap_or(UNKNOWN);
    let namespace = str_at(raw, &["metadata", "namespace"]).unwrap_or(UNKNOWN);
    let project = str_at(raw, &["spec", "project"]).unwrap_or(DEFAULT_PROJECT);

    // Explicit server URL wins over the named cluster alias. Empty strings
    // count as unset here, unlike the other fields.
    let cluster = [
        str_at(raw, &["spec", "destination", "server"]),
        str_at(raw, &["spec", "destination", "name"]),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
    .unwrap_or(UNKNOWN);

    let health_status = str_at(raw, &["status", "health", "status"]).unwrap_or(UNKNOWN_STATUS);
    let sync_status = str_at(raw, &["status", "sync", "status"]).unwrap_or(UNKNOWN_STATUS);

    AppObservation {
        target: target.to_string(),
        name: name.to_string(),
        project: project.to_string(),
        namespace: namespace.to_string(),
        cluster: cluster.to_string(),
        health_status: health_status.to_string(),
        sync_status: sync_status.to_string(),
    }
}

/// Walk `path` through nested objects; `None` unless the leaf is a string.
fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |node, key| node.get(key))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TARGET: &str = "https://ctrl.example.com";

    #[test]
    fn full_record() {
        let raw = json!({
            "metadata": {"name": "app1", "namespace": "default"},
            "spec": {
                "project": "default",
                "destination": {"server": "https://k8s.local"}
            },
            "status": {
                "health": {"status": "Healthy"},
                "sync": {"status": "Synced"}
            }
        });

        let obs = normalize(TARGET, &raw);
        assert_eq!(
            obs,
            AppObservation {
                target: TARGET.to_string(),
                name: "app1".to_string(),
                project: "default".to_string(),
                namespace: "default".to_string(),
                cluster: "https://k8s.local".to_string(),
                health_status: "Healthy".to_string(),
                sync_status: "Synced".to_string(),
            }
        );
        assert!(obs.is_healthy());
        assert!(obs.is_synced());
    }

    #[test]
    fn missing_namespace_project_destination() {
        let raw = json!({"metadata": {"name": "bare"}, "spec": {}, "status": {}});
        let obs = normalize(TARGET, &raw);
        assert_eq!(obs.name, "bare");
        assert_eq!(obs.namespace, "unknown");
        assert_eq!(obs.project, "default");
        assert_eq!(obs.cluster, "unknown");
        assert_eq!(obs.health_status, "Unknown");
        assert_eq!(obs.sync_status, "Unknown");
    }

    #[test]
    fn empty_object_gets_all_defaults() {
        let obs = normalize(TARGET, &json!({}));
        assert_eq!(obs.name, "unknown");
        assert_eq!(obs.target, TARGET);
        assert!(!obs.is_healthy());
        assert!(!obs.is_synced());
    }

    #[test]
    fn destination_name_used_without_server() {
        let raw = json!({"spec": {"destination": {"name": "in-cluster"}}});
        assert_eq!(normalize(TARGET, &raw).cluster, "in-cluster");
    }

    #[test]
    fn empty_server_falls_back_to_name() {
        let raw = json!({"spec": {"destination": {"server": "", "name": "prod"}}});
        assert_eq!(normalize(TARGET, &raw).cluster, "prod");
    }

    #[test]
    fn server_preferred_over_name() {
        let raw = json!({
            "spec": {"destination": {"server": "https://k8s.local", "name": "in-cluster"}}
        });
        assert_eq!(normalize(TARGET, &raw).cluster, "https://k8s.local");
    }

    #[test]
    fn mistyped_fields_degrade_to_defaults() {
        let raw = json!({
            "metadata": "not-an-object",
            "spec": {"project": 42, "destination": ["x"]},
            "status": {"health": null, "sync": {"status": true}}
        });
        let obs = normalize(TARGET, &raw);
        assert_eq!(obs.name, "unknown");
        assert_eq!(obs.project, "default");
        assert_eq!(obs.cluster, "unknown");
        assert_eq!(obs.health_status, "Unknown");
        assert_eq!(obs.sync_status, "Unknown");
    }

    #[test]
    fn non_object_record() {
        let obs = normalize(TARGET, &json!("garbage"));
        assert_eq!(obs.name, "unknown");
        assert_eq!(obs.namespace, "unknown");
    }

    #[test]
    fn degraded_and_out_of_sync() {
        let raw = json!({
            "metadata": {"name": "app2", "namespace": "argocd"},
            "spec": {"project": "system", "destination": {"name": "in-cluster"}},
            "status": {"health": {"status": "Degraded"}, "sync": {"status": "OutOfSync"}}
        });
        let obs = normalize(TARGET, &raw);
        assert_eq!(obs.health_status, "Degraded");
        assert_eq!(obs.sync_status, "OutOfSync");
        assert!(!obs.is_healthy());
        assert!(!obs.is_synced());
    }
}
