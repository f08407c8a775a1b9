//! Service orchestrator.
//!
//! # Data Flow
//! ```text
//! ServiceBuilder::register(name, component)*
//!     → build(): Registry (names unique)
//!     → Service::init(): resolver injects declared dependencies
//!     → Service::run(): runner launches every can_run component
//!         ... blocks while long-lived components serve ...
//!     → signal / token cancelled
//!     → Service::stop(): coordinator stops every can_stop component
//! ```
//!
//! # Design Decisions
//! - One cancellation token per service, shared by run contexts and the
//!   shutdown coordinator
//! - Each phase runs at most once; repeated stop is a no-op
//! - The registry is frozen once built

mod builder;
mod orchestrator;

pub use builder::ServiceBuilder;
pub use orchestrator::Service;
