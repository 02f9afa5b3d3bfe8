//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration shared by both binaries.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ShellConfig {
    /// Backend HTTP service settings.
    pub api: ApiConfig,

    /// Access-guard settings.
    pub session: SessionConfig,

    /// Where and how applications mount.
    pub shell: MountConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend HTTP service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address for `shell-api` (e.g., "0.0.0.0:4000").
    pub bind_address: String,

    /// Per-request timeout, both server side and in the client fetcher.
    pub request_timeout_secs: u64,

    /// Base URL the data layer and `shell-cli` send requests to.
    pub base_url: String,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
            request_timeout_secs: 30,
            base_url: "http://127.0.0.1:4000".to_string(),
        }
    }
}

/// Access-guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Authorization value reported by the static session resolver.
    /// No credential is checked.
    pub authorized: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { authorized: true }
    }
}

/// Mount configuration for the composition root.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Id of the host container the application renders into.
    pub container_id: String,

    /// Location navigated to right after mounting.
    pub initial_location: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            container_id: "root".to_string(),
            initial_location: "/".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
