//! Error types shared by the orchestration layer.
//!
//! # Taxonomy
//! - Resolution errors: duplicate names, missing dependencies (strict mode),
//!   rejected injections
//! - Run-phase errors: the first component whose `run` fails
//! - Stop-phase errors: every component that failed or was abandoned during
//!   shutdown, gathered into a [`ShutdownReport`]
//!
//! Pool errors live in [`crate::pool::PoolError`]; configuration errors in
//! [`crate::config::loader::ConfigError`].

use std::time::Duration;

use crate::config::loader::ConfigError;
use crate::lifecycle::shutdown::ShutdownReport;
use crate::pool::PoolError;

/// Boxed error used at the factory / close-function boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by a component's initializer.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("{0}")]
    Message(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("component panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(#[from] BoxError),
}

impl ComponentError {
    pub fn msg(message: impl Into<String>) -> Self {
        ComponentError::Message(message.into())
    }

    /// Build from a panic payload caught while polling a component future.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ComponentError::Panicked(message)
    }
}

/// Why a single component did not stop cleanly.
#[derive(Debug, thiserror::Error)]
pub enum StopFailure {
    #[error("component `{component}` failed to stop: {source}")]
    Failed {
        component: String,
        #[source]
        source: ComponentError,
    },

    #[error("component `{component}` abandoned after {timeout:?} without stopping")]
    Abandoned { component: String, timeout: Duration },
}

impl StopFailure {
    pub fn component(&self) -> &str {
        match self {
            StopFailure::Failed { component, .. } | StopFailure::Abandoned { component, .. } => {
                component
            }
        }
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, StopFailure::Abandoned { .. })
    }
}

/// Top-level orchestration error.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("component `{0}` is already registered")]
    DuplicateComponent(String),

    #[error("component `{component}` depends on unregistered component `{dependency}`")]
    MissingDependency {
        component: String,
        dependency: String,
    },

    #[error("component `{component}` rejected dependency `{dependency}`: {source}")]
    Injection {
        component: String,
        dependency: String,
        #[source]
        source: ComponentError,
    },

    #[error("component `{component}` failed: {source}")]
    Run {
        component: String,
        #[source]
        source: ComponentError,
    },

    #[error("{0}")]
    Shutdown(ShutdownReport),

    #[error("service components already initialized")]
    AlreadyInitialized,

    #[error("service components failed to initialize")]
    NotInitialized,

    #[error("service components already running")]
    AlreadyRunning,

    #[error("signal handling failed: {0}")]
    Signal(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
