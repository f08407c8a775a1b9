//! Typed dependency values and the capability traits they carry.

use std::fmt;
use std::sync::Arc;

use tracing::Level;

use crate::component::Component;

/// Subsystem roles a component can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Logger,
    Tracer,
    Server,
    Client,
    Broker,
    Database,
    Registry,
    KvStore,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Logger => "logger",
            Role::Tracer => "tracer",
            Role::Server => "server",
            Role::Client => "client",
            Role::Broker => "broker",
            Role::Database => "database",
            Role::Registry => "registry",
            Role::KvStore => "kvstore",
        };
        f.write_str(name)
    }
}

/// Structured logging capability.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, component: &str, message: &str);

    fn debug(&self, component: &str, message: &str) {
        self.log(Level::DEBUG, component, message);
    }

    fn info(&self, component: &str, message: &str) {
        self.log(Level::INFO, component, message);
    }

    fn warn(&self, component: &str, message: &str) {
        self.log(Level::WARN, component, message);
    }

    fn error(&self, component: &str, message: &str) {
        self.log(Level::ERROR, component, message);
    }
}

/// Network server capability.
pub trait Server: Send + Sync {
    /// Address peers (clients, service registries) should use to reach it.
    fn address(&self) -> String;
}

/// A resolved dependency, tagged by the capability it provides.
#[derive(Clone)]
pub enum Dependency {
    Logger(Arc<dyn Logger>),
    Server(Arc<dyn Server>),
    /// A peer with no capability trait defined by the core.
    Component {
        role: Role,
        component: Arc<dyn Component>,
    },
    /// The declared name is not registered.
    Missing(String),
}

impl Dependency {
    pub fn role(&self) -> Option<Role> {
        match self {
            Dependency::Logger(_) => Some(Role::Logger),
            Dependency::Server(_) => Some(Role::Server),
            Dependency::Component { role, .. } => Some(*role),
            Dependency::Missing(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Dependency::Missing(_))
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Missing(name) => f.debug_tuple("Missing").field(name).finish(),
            other => f
                .debug_struct("Dependency")
                .field("role", &other.role())
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullLogger;

    impl Logger for NullLogger {
        fn log(&self, _level: Level, _component: &str, _message: &str) {}
    }

    #[test]
    fn role_follows_variant() {
        let logger = Dependency::Logger(Arc::new(NullLogger));
        assert_eq!(logger.role(), Some(Role::Logger));
        assert!(!logger.is_missing());

        let missing = Dependency::Missing("tracer".into());
        assert_eq!(missing.role(), None);
        assert!(missing.is_missing());
    }

    #[test]
    fn role_display_matches_registration_names() {
        assert_eq!(Role::Logger.to_string(), "logger");
        assert_eq!(Role::KvStore.to_string(), "kvstore");
    }
}
