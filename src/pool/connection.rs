//! Leased connection wrapper.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::pool::connection_pool::{Idle, PoolInner};
use crate::pool::PoolError;

/// A connection leased from a [`ConnectionPool`](crate::pool::ConnectionPool).
///
/// While leased the caller owns it. `close` (or dropping the wrapper) hands it
/// back: it is queued for reuse when its address has room, otherwise closed.
pub struct PooledConnection<C> {
    /// `Some` until released.
    idle: Option<Idle<C>>,
    address: String,
    pool: Arc<PoolInner<C>>,
}

impl<C> PooledConnection<C> {
    pub(crate) fn new(address: String, idle: Idle<C>, pool: Arc<PoolInner<C>>) -> Self {
        Self {
            idle: Some(idle),
            address,
            pool,
        }
    }

    /// Address this connection was created for.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Hand the connection back to the pool.
    ///
    /// Errors come from the pool's close function when the connection could
    /// not be queued.
    pub fn close(mut self) -> Result<(), PoolError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), PoolError> {
        match self.idle.take() {
            Some(idle) => self.pool.release(&self.address, idle),
            None => Ok(()),
        }
    }

    fn idle(&self) -> &Idle<C> {
        self.idle
            .as_ref()
            .expect("pooled connection accessed after release")
    }
}

impl<C> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.idle().conn
    }
}

impl<C> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self
            .idle
            .as_mut()
            .expect("pooled connection accessed after release")
            .conn
    }
}

impl<C> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(address = %self.address, error = %e, "Failed to close released connection");
        }
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("address", &self.address)
            .field("conn", &self.idle.as_ref().map(|idle| &idle.conn))
            .finish()
    }
}
