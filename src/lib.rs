//! Pluggable service bootstrap.
//!
//! Register components, let the service inject their declared dependencies,
//! run them concurrently, and stop them all on a signal or cancellation.

pub mod component;
pub mod components;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod service;

pub use component::{Component, Dependency, Initializer, Logger, Role, Server};
pub use config::schema::ServiceConfig;
pub use error::{ComponentError, ServiceError};
pub use lifecycle::Context;
pub use pool::{ConnectionPool, PooledConnection};
pub use service::{Service, ServiceBuilder};
