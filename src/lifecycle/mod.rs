//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     resolved registry → spawn run(ctx) per startable component
//!     → fanin.rs merges results → first error or all done
//!
//! Shutdown (shutdown.rs):
//!     signal or cancellation → spawn stop(ctx) per stoppable component
//!     → per-stop deadline → ShutdownReport (failed vs abandoned)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → cancel the service token
//! ```
//!
//! # Design Decisions
//! - One cancellation token per service, created at construction and
//!   cancelled once; both runner and coordinator observe it
//! - No phase barriers: runs start together, stops start together
//! - Stop has an optional deadline; components that miss it are abandoned

pub mod context;
pub mod fanin;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use context::Context;
pub use shutdown::ShutdownReport;
