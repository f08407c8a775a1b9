//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters for component exits and pool traffic)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (component, address, outcome) on every event
//! - Metrics are cheap counters; recording without an installed exporter is a no-op

pub mod logging;
pub mod metrics;
