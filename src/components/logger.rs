//! Logger component backed by `tracing`.

use std::sync::Arc;

use tracing::Level;

use crate::component::{Component, Dependency, Initializer, Logger};

/// Forwards component log lines to the global `tracing` subscriber.
///
/// Has no lifecycle; it only exists to be injected.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    service: String,
}

impl TracingLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, component: &str, message: &str) {
        emit(level, Some(&self.service), component, message);
    }
}

impl Component for TracingLogger {
    fn initializer(&self) -> Option<Arc<dyn Initializer>> {
        None
    }

    fn dependency(self: Arc<Self>) -> Dependency {
        Dependency::Logger(self)
    }
}

/// `tracing` macros need a constant level.
pub(crate) fn emit(level: Level, service: Option<&str>, component: &str, message: &str) {
    let service = service.unwrap_or("-");
    match level {
        Level::ERROR => tracing::error!(service, component, "{message}"),
        Level::WARN => tracing::warn!(service, component, "{message}"),
        Level::INFO => tracing::info!(service, component, "{message}"),
        Level::DEBUG => tracing::debug!(service, component, "{message}"),
        _ => tracing::trace!(service, component, "{message}"),
    }
}
