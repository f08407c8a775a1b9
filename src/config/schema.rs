//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for a bootstrapped service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service identity.
    pub service: ServiceSection,

    /// Startup and shutdown behavior.
    pub lifecycle: LifecycleConfig,

    /// Built-in HTTP server component.
    pub server: ServerConfig,

    /// Built-in TCP client component and its connection pool.
    pub client: ClientConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSection {
    /// Name attached to every log line.
    pub name: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "service".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Per-component stop deadline in seconds (0 = wait indefinitely).
    pub stop_timeout_secs: u64,

    /// Fail initialization when a declared dependency is not registered.
    pub strict_dependencies: bool,
}

impl LifecycleConfig {
    pub fn stop_timeout(&self) -> Option<Duration> {
        (self.stop_timeout_secs > 0).then(|| Duration::from_secs(self.stop_timeout_secs))
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            stop_timeout_secs: 10,
            strict_dependencies: false,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// TCP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Idle connections kept per address.
    pub pool_capacity: usize,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Optional cap on idle + leased connections.
    pub max_open: Option<usize>,

    /// How long a dial waits for a free slot when `max_open` is reached.
    pub acquire_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pool_capacity: crate::pool::DEFAULT_CAPACITY,
            connect_timeout_secs: 5,
            max_open: None,
            acquire_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
