//! Keyed connection pool.
//!
//! # Data Flow
//! ```text
//! client.dial(address)
//!     → connection_pool.rs: look up the idle queue for address
//!         - idle connection available → lease it
//!         - queue empty or new        → factory(address)
//!     → connection.rs: PooledConnection (address + back-reference)
//!
//! PooledConnection::close() / drop
//!     → queue.rs: push back if below capacity
//!     → otherwise close_fn(connection)
//!
//! ConnectionPool::close()
//!     → mark closed, close every queue, close_fn every idle connection
//! ```
//!
//! # Design Decisions
//! - Capacity bounds idle connections per address, not leased ones; a miss
//!   always creates a new connection instead of waiting
//! - Releasing never blocks: overflow is closed, not queued
//! - Optional `max_open` adds admission control over idle + leased; a full
//!   pool evicts an idle connection of another address before waiting
//! - Leased connections are never force-closed by `ConnectionPool::close`

pub mod builder;
pub mod connection;
pub mod connection_pool;
pub mod queue;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::error::BoxError;

pub use builder::PoolBuilder;
pub use connection::PooledConnection;
pub use connection_pool::ConnectionPool;

/// Default idle capacity per address.
pub const DEFAULT_CAPACITY: usize = 10;

/// Creates a new connection for an address.
pub type Factory<C> =
    Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = Result<C, BoxError>> + Send>> + Send + Sync>;

/// Terminates a connection that will not be reused.
pub type CloseFn<C> = Arc<dyn Fn(C) -> Result<(), BoxError> + Send + Sync>;

/// Errors returned by the pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("connection pool closed")]
    Closed,

    #[error("failed to create connection to {address}: {source}")]
    Factory {
        address: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to close connection: {0}")]
    Close(#[source] BoxError),

    #[error("no connection slot for {address} within {timeout:?}")]
    Exhausted { address: String, timeout: Duration },
}
