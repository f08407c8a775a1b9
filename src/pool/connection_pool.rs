//! The pool itself: per-address idle queues behind a coarse lock.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::time::Instant;

use crate::error::BoxError;
use crate::observability::metrics;
use crate::pool::queue::{IdleQueue, Push};
use crate::pool::{CloseFn, Factory, PoolBuilder, PoolError, PooledConnection};

/// A connection resting in (or leased from) the pool, plus its admission slot.
pub(crate) struct Idle<C> {
    pub(crate) conn: C,
    pub(crate) permit: Option<OwnedSemaphorePermit>,
}

enum Admitted<C> {
    Reused(Idle<C>),
    Slot(OwnedSemaphorePermit),
}

pub(crate) struct Admission {
    pub(crate) slots: Arc<Semaphore>,
    pub(crate) timeout: Duration,
}

struct PoolState<C> {
    queues: HashMap<String, Arc<IdleQueue<Idle<C>>>>,
    closed: bool,
}

pub(crate) struct PoolInner<C> {
    state: RwLock<PoolState<C>>,
    factory: Factory<C>,
    close_fn: CloseFn<C>,
    capacity: usize,
    admission: Option<Admission>,
    /// Woken whenever a connection or slot is handed back.
    released: Notify,
}

impl<C> PoolInner<C> {
    pub(crate) fn new(
        factory: Factory<C>,
        close_fn: CloseFn<C>,
        capacity: usize,
        admission: Option<Admission>,
    ) -> Self {
        Self {
            state: RwLock::new(PoolState {
                queues: HashMap::new(),
                closed: false,
            }),
            factory,
            close_fn,
            capacity,
            admission,
            released: Notify::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PoolState<C>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PoolState<C>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find the queue for `address`, creating it on first use.
    fn queue_for(&self, address: &str) -> Result<Arc<IdleQueue<Idle<C>>>, PoolError> {
        {
            let state = self.read();
            if state.closed {
                return Err(PoolError::Closed);
            }
            if let Some(queue) = state.queues.get(address) {
                return Ok(Arc::clone(queue));
            }
        }

        let mut state = self.write();
        if state.closed {
            return Err(PoolError::Closed);
        }
        let capacity = self.capacity;
        let queue = state
            .queues
            .entry(address.to_string())
            .or_insert_with(|| Arc::new(IdleQueue::new(capacity)));
        tracing::debug!(address = %address, capacity = queue.capacity(), "Idle queue ready");
        Ok(Arc::clone(queue))
    }

    /// Close one idle connection queued under any address but `address`,
    /// freeing its admission slot. Returns `false` when none was idle.
    fn evict_idle(&self, address: &str) -> bool {
        let evicted = {
            let state = self.read();
            state
                .queues
                .iter()
                .filter(|(other, _)| other.as_str() != address)
                .find_map(|(other, queue)| queue.pop().map(|idle| (other.clone(), idle)))
        };

        let Some((other, Idle { conn, permit })) = evicted else {
            return false;
        };

        tracing::debug!(address = %other, wanted = %address, "Evicting idle connection to free a slot");
        metrics::record_pool_release("evicted");
        if let Err(e) = (self.close_fn)(conn) {
            tracing::warn!(address = %other, error = %e, "Failed to close evicted connection");
        }
        drop(permit);
        true
    }

    /// Return a leased connection, closing it if it cannot be queued.
    pub(crate) fn release(&self, address: &str, idle: Idle<C>) -> Result<(), PoolError> {
        let rejected = {
            let state = self.read();
            match state.queues.get(address) {
                Some(queue) if !state.closed => match queue.push(idle) {
                    Push::Queued => None,
                    Push::Rejected(idle) => Some(idle),
                },
                _ => Some(idle),
            }
        };

        let Some(Idle { conn, permit }) = rejected else {
            metrics::record_pool_release("queued");
            self.released.notify_waiters();
            return Ok(());
        };

        tracing::trace!(address = %address, "Idle queue full or closed, closing connection");
        metrics::record_pool_release("closed");
        let result = (self.close_fn)(conn).map_err(PoolError::Close);
        drop(permit);
        self.released.notify_waiters();
        result
    }
}

/// Keyed cache of reusable connections.
///
/// Cloning shares the same pool.
pub struct ConnectionPool<C> {
    inner: Arc<PoolInner<C>>,
}

impl<C> Clone for ConnectionPool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Send + 'static> ConnectionPool<C> {
    /// Start building a pool around `factory`.
    pub fn builder<F, Fut>(factory: F) -> PoolBuilder<C>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, BoxError>> + Send + 'static,
    {
        PoolBuilder::new(factory)
    }
}

impl<C> ConnectionPool<C> {
    pub(crate) fn from_inner(inner: PoolInner<C>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Lease a connection to `address`, reusing an idle one when available.
    pub async fn get(&self, address: &str) -> Result<PooledConnection<C>, PoolError> {
        let queue = self.inner.queue_for(address)?;

        let permit = match &self.inner.admission {
            None => None,
            Some(admission) => match self.admit(address, &queue, admission).await? {
                Admitted::Reused(idle) => return Ok(self.lease(address, idle)),
                Admitted::Slot(permit) => Some(permit),
            },
        };

        if permit.is_none() {
            if let Some(idle) = queue.pop() {
                tracing::trace!(address = %address, "Reusing idle connection");
                metrics::record_pool_get("hit");
                return Ok(self.lease(address, idle));
            }
        }
        if queue.is_closed() {
            return Err(PoolError::Closed);
        }

        tracing::debug!(address = %address, "No idle connection, creating one");
        metrics::record_pool_get("miss");
        let created = (self.inner.factory)(address.to_string()).await;
        match created {
            Ok(conn) => Ok(self.lease(address, Idle { conn, permit })),
            Err(source) => {
                metrics::record_pool_get("error");
                drop(permit);
                self.inner.released.notify_waiters();
                Err(PoolError::Factory {
                    address: address.to_string(),
                    source,
                })
            }
        }
    }

    /// Wait until an idle connection or a free slot shows up.
    async fn admit(
        &self,
        address: &str,
        queue: &IdleQueue<Idle<C>>,
        admission: &Admission,
    ) -> Result<Admitted<C>, PoolError> {
        let deadline = Instant::now() + admission.timeout;

        loop {
            // Register before checking so a release in between is not missed.
            let notified = self.inner.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(idle) = queue.pop() {
                tracing::trace!(address = %address, "Reusing idle connection");
                metrics::record_pool_get("hit");
                return Ok(Admitted::Reused(idle));
            }
            match Arc::clone(&admission.slots).try_acquire_owned() {
                Ok(permit) => return Ok(Admitted::Slot(permit)),
                Err(TryAcquireError::Closed) => return Err(PoolError::Closed),
                Err(TryAcquireError::NoPermits) => {
                    // Every slot may be parked idle under other addresses.
                    if self.inner.evict_idle(address) {
                        continue;
                    }
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                metrics::record_pool_get("exhausted");
                return Err(PoolError::Exhausted {
                    address: address.to_string(),
                    timeout: admission.timeout,
                });
            }
        }
    }

    fn lease(&self, address: &str, idle: Idle<C>) -> PooledConnection<C> {
        PooledConnection::new(address.to_string(), idle, Arc::clone(&self.inner))
    }

    /// Close the pool and every idle connection.
    ///
    /// Leased connections stay open; they are closed when released.
    pub fn close(&self) -> Result<(), PoolError> {
        let queues = {
            let mut state = self.inner.write();
            if state.closed {
                return Err(PoolError::Closed);
            }
            state.closed = true;
            std::mem::take(&mut state.queues)
        };

        if let Some(admission) = &self.inner.admission {
            admission.slots.close();
        }
        self.inner.released.notify_waiters();

        let mut first_error = None;
        let mut closed = 0usize;
        for (address, queue) in queues {
            for Idle { conn, permit } in queue.close() {
                closed += 1;
                if let Err(e) = (self.inner.close_fn)(conn) {
                    tracing::warn!(address = %address, error = %e, "Failed to close idle connection");
                    first_error.get_or_insert(PoolError::Close(e));
                }
                drop(permit);
            }
        }

        tracing::info!(closed, "Connection pool closed");
        first_error.map_or(Ok(()), Err)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }

    /// Number of idle connections queued for `address`.
    pub fn idle_count(&self, address: &str) -> usize {
        self.inner
            .read()
            .queues
            .get(address)
            .map_or(0, |queue| queue.len())
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl<C> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read();
        f.debug_struct("ConnectionPool")
            .field("capacity", &self.inner.capacity)
            .field("addresses", &state.queues.len())
            .field("closed", &state.closed)
            .finish()
    }
}
