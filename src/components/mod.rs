//! Built-in components.
//!
//! Ready-made adapters a binary can register with the service builder:
//!
//! | Name (conventional) | Type            | Role   | Lifecycle       |
//! |---------------------|-----------------|--------|-----------------|
//! | `logger`            | `TracingLogger` | logger | none            |
//! | `http`              | `HttpServer`    | server | run + stop      |
//! | `tcp`               | `TcpClient`     | client | stop            |
//!
//! Server and client declare a dependency on `logger` and fall back to plain
//! `tracing` events when it is not registered.

pub mod http;
pub mod logger;
pub mod tcp_client;

pub use http::HttpServer;
pub use logger::TracingLogger;
pub use tcp_client::TcpClient;

use std::sync::{Arc, OnceLock};

use tracing::Level;

use crate::component::{Dependency, Logger};
use crate::error::ComponentError;

/// Conventional registry name of the logger component.
pub const LOGGER: &str = "logger";

/// Slot holding an injected logger.
#[derive(Default)]
pub(crate) struct LoggerSlot(OnceLock<Arc<dyn Logger>>);

impl LoggerSlot {
    /// Accept a logger dependency. A missing logger is tolerated.
    pub(crate) fn inject(&self, dependency: Dependency) -> Result<(), ComponentError> {
        match dependency {
            Dependency::Logger(logger) => {
                // Repeated injection keeps the first logger.
                let _ = self.0.set(logger);
                Ok(())
            }
            Dependency::Missing(_) => Ok(()),
            other => Err(ComponentError::msg(format!(
                "expected a logger, got {:?}",
                other.role()
            ))),
        }
    }

    pub(crate) fn log(&self, level: Level, component: &str, message: &str) {
        match self.0.get() {
            Some(logger) => logger.log(level, component, message),
            None => logger::emit(level, None, component, message),
        }
    }
}
