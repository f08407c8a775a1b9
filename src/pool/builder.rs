//! Pool construction options.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::BoxError;
use crate::pool::connection_pool::{Admission, PoolInner};
use crate::pool::{CloseFn, ConnectionPool, Factory, DEFAULT_CAPACITY};

const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for [`ConnectionPool`].
pub struct PoolBuilder<C> {
    factory: Factory<C>,
    close_fn: Option<CloseFn<C>>,
    capacity: usize,
    max_open: Option<usize>,
    acquire_timeout: Duration,
}

impl<C: Send + 'static> PoolBuilder<C> {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, BoxError>> + Send + 'static,
    {
        let factory: Factory<C> = Arc::new(
            move |address: String| -> Pin<Box<dyn Future<Output = Result<C, BoxError>> + Send>> {
                Box::pin(factory(address))
            },
        );

        Self {
            factory,
            close_fn: None,
            capacity: DEFAULT_CAPACITY,
            max_open: None,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Idle connections kept per address. Zero disables reuse.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// How connections that will not be reused are terminated.
    /// Defaults to dropping them.
    pub fn close_fn<F>(mut self, close_fn: F) -> Self
    where
        F: Fn(C) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.close_fn = Some(Arc::new(close_fn));
        self
    }

    /// Cap idle + leased connections across all addresses. `get` waits up to
    /// the acquire timeout for a slot once the cap is reached.
    pub fn max_open(mut self, max_open: usize) -> Self {
        self.max_open = Some(max_open);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn build(self) -> ConnectionPool<C> {
        let close_fn: CloseFn<C> = match self.close_fn {
            Some(close_fn) => close_fn,
            None => Arc::new(|conn: C| {
                drop(conn);
                Ok::<(), BoxError>(())
            }),
        };
        let admission = self.max_open.map(|max_open| Admission {
            slots: Arc::new(Semaphore::new(max_open)),
            timeout: self.acquire_timeout,
        });

        tracing::debug!(
            capacity = self.capacity,
            max_open = ?self.max_open,
            "Connection pool created"
        );

        ConnectionPool::from_inner(PoolInner::new(
            self.factory,
            close_fn,
            self.capacity,
            admission,
        ))
    }
}
