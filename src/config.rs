//! Runtime configuration
//!
//! `Settings` is built once at startup (defaults, then an optional YAML file,
//! then CLI flags) and shared read-only with the gate and the orchestrator.

use crate::{QuorumGateError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Address the HTTPS admission endpoint binds to.
    pub listen_addr: String,
    pub tls_cert: String,
    pub tls_key: String,
    /// Label whose value groups the replicas of one store.
    pub label_key: String,
    /// Containers whose image starts with this prefix run the store.
    pub store_image_prefix: String,
    /// Name of the container port that serves store clients.
    pub client_port_name: String,
    /// Per-call ceiling for every remote call.
    pub timeout_secs: u64,
    /// Namespace the store replicas live in.
    pub namespace: String,
    pub grace_period_seconds: i64,
    /// Requests from members of this group are never intercepted.
    pub reserved_group: String,
    pub endpoint_scheme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8443".to_string(),
            tls_cert: "server.crt".to_string(),
            tls_key: "server.key".to_string(),
            label_key: "app".to_string(),
            store_image_prefix: "quay.io/coreos/etcd".to_string(),
            client_port_name: "client".to_string(),
            timeout_secs: 30,
            namespace: "default".to_string(),
            grace_period_seconds: 5,
            reserved_group: "system:serviceaccounts".to_string(),
            endpoint_scheme: "http".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&raw).map_err(|e| {
            QuorumGateError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let non_empty = [
            ("label_key", &self.label_key),
            ("store_image_prefix", &self.store_image_prefix),
            ("client_port_name", &self.client_port_name),
            ("namespace", &self.namespace),
            ("reserved_group", &self.reserved_group),
            ("endpoint_scheme", &self.endpoint_scheme),
        ];
        for (field, value) in non_empty {
            if value.trim().is_empty() {
                return Err(QuorumGateError::ConfigError(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(QuorumGateError::ConfigError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.grace_period_seconds < 0 {
            return Err(QuorumGateError::ConfigError(format!(
                "grace_period_seconds must not be negative, got {}",
                self.grace_period_seconds
            )));
        }

        Ok(())
    }
}
