//! Service assembly.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::component::resolver::MissingPolicy;
use crate::component::{Component, Registry};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::service::Service;

const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Collects components and lifecycle options before the registry is frozen.
pub struct ServiceBuilder {
    name: String,
    components: Vec<(String, Arc<dyn Component>)>,
    token: Option<CancellationToken>,
    policy: MissingPolicy,
    stop_timeout: Option<Duration>,
}

impl ServiceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            token: None,
            policy: MissingPolicy::Lenient,
            stop_timeout: Some(DEFAULT_STOP_TIMEOUT),
        }
    }

    /// Start from the `[service]` and `[lifecycle]` sections of a config.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.service.name.clone())
            .strict_dependencies(config.lifecycle.strict_dependencies)
            .stop_timeout(config.lifecycle.stop_timeout())
    }

    /// Register a component under `name`. Duplicates are reported by `build`.
    pub fn register(mut self, name: impl Into<String>, component: Arc<dyn Component>) -> Self {
        self.components.push((name.into(), component));
        self
    }

    /// Use an externally owned token; cancelling it shuts the service down.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn strict_dependencies(mut self, strict: bool) -> Self {
        self.policy = if strict {
            MissingPolicy::Strict
        } else {
            MissingPolicy::Lenient
        };
        self
    }

    /// Per-component stop deadline, `None` to wait indefinitely.
    pub fn stop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Service, ServiceError> {
        let mut registry = Registry::new();
        for (name, component) in self.components {
            registry.insert(name, component)?;
        }

        tracing::debug!(
            service = %self.name,
            components = registry.len(),
            policy = ?self.policy,
            stop_timeout = ?self.stop_timeout,
            "Service assembled"
        );

        Ok(Service::new(
            self.name,
            registry,
            self.token.unwrap_or_default(),
            self.policy,
            self.stop_timeout,
        ))
    }
}
