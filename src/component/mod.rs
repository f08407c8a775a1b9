//! Component contract and dependency resolution.
//!
//! # Data Flow
//! ```text
//! ServiceBuilder::register(name, component)
//!     → registry.rs (name → Arc<dyn Component>, unique keys)
//!
//! Service::init():
//!     → resolver.rs walks the registry once
//!     → for each declared dependency name:
//!         registry lookup → Component::dependency() → tagged Dependency
//!         → Initializer::add_dependency()
//! ```
//!
//! # Design Decisions
//! - Injection is typed: peers arrive as a `Dependency` variant keyed by role,
//!   never as an opaque value that has to be downcast
//! - Unknown dependency names inject `Dependency::Missing` unless strict mode
//!   is enabled
//! - Resolution happens exactly once, before any `run`

pub mod dependency;
pub mod initializer;
pub mod registry;
pub mod resolver;

pub use dependency::{Dependency, Logger, Role, Server};
pub use initializer::{Component, Initializer};
pub use registry::Registry;
