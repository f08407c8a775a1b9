//! Connection pool behavior through the public API.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use service_bootstrap::error::BoxError;
use service_bootstrap::pool::{ConnectionPool, PoolBuilder, PoolError};

/// Pool of numbered connections with counters for factory and close calls.
struct Harness {
    created: Arc<AtomicUsize>,
    closed: Arc<Mutex<Vec<usize>>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            created: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn builder(&self) -> PoolBuilder<usize> {
        let created = self.created.clone();
        let closed = self.closed.clone();
        ConnectionPool::builder(move |_address: String| {
            let id = created.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, BoxError>(id) }
        })
        .close_fn(move |id| {
            closed.lock().unwrap().push(id);
            Ok(())
        })
    }

    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn closed(&self) -> Vec<usize> {
        self.closed.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn released_connection_is_returned_by_next_get() {
    let harness = Harness::new();
    let pool = harness.builder().capacity(1).build();

    let first = pool.get("X").await.unwrap();
    let id = *first;
    first.close().unwrap();

    let second = pool.get("X").await.unwrap();
    assert_eq!(*second, id);
    assert_eq!(harness.created(), 1);
}

#[tokio::test]
async fn zero_capacity_closes_on_release() {
    let harness = Harness::new();
    let pool = harness.builder().capacity(0).build();

    let conn = pool.get("X").await.unwrap();
    let id = *conn;
    conn.close().unwrap();
    assert_eq!(harness.closed(), vec![id]);

    let next = pool.get("X").await.unwrap();
    assert_ne!(*next, id);
    assert_eq!(harness.created(), 2);
}

#[tokio::test]
async fn closed_pool_never_hands_out_connections() {
    let harness = Harness::new();
    let pool = harness.builder().build();

    pool.get("X").await.unwrap().close().unwrap();
    pool.get("Y").await.unwrap().close().unwrap();
    pool.close().unwrap();

    assert_eq!(harness.closed().len(), 2);
    for address in ["X", "Y", "Z"] {
        assert!(matches!(pool.get(address).await, Err(PoolError::Closed)));
    }
    assert!(matches!(pool.close(), Err(PoolError::Closed)));
    assert_eq!(harness.created(), 2);
}

#[tokio::test]
async fn leased_connection_closes_after_pool_close() {
    let harness = Harness::new();
    let pool = harness.builder().build();

    let leased = pool.get("X").await.unwrap();
    let id = *leased;
    pool.close().unwrap();
    assert!(harness.closed().is_empty());

    leased.close().unwrap();
    assert_eq!(harness.closed(), vec![id]);
}

#[tokio::test]
async fn gets_without_release_always_miss() {
    let harness = Harness::new();
    let pool = harness.builder().capacity(2).build();

    let a = pool.get("X").await.unwrap();
    let b = pool.get("X").await.unwrap();
    let c = pool.get("X").await.unwrap();

    assert_eq!(harness.created(), 3);
    assert_eq!(HashSet::from([*a, *b, *c]).len(), 3);
}

#[tokio::test]
async fn repeated_get_and_release_reuses_one_connection() {
    let harness = Harness::new();
    let pool = harness.builder().capacity(1).build();

    for _ in 0..5 {
        pool.get("X").await.unwrap().close().unwrap();
    }

    assert_eq!(harness.created(), 1);
    assert_eq!(pool.idle_count("X"), 1);
    assert!(harness.closed().is_empty());
}

#[tokio::test]
async fn dropping_a_lease_releases_it() {
    let harness = Harness::new();
    let pool = harness.builder().capacity(1).build();

    {
        let _conn = pool.get("X").await.unwrap();
    }
    assert_eq!(pool.idle_count("X"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_leases_are_exclusive() {
    let harness = Harness::new();
    let pool = harness.builder().capacity(4).build();
    let leased = Arc::new(Mutex::new(HashSet::new()));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let pool = pool.clone();
        let leased = leased.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..50 {
                let conn = pool.get("X").await.unwrap();
                assert!(leased.lock().unwrap().insert(*conn), "connection leased twice");
                tokio::task::yield_now().await;
                leased.lock().unwrap().remove(&*conn);
                conn.close().unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert!(pool.idle_count("X") <= 4);
}

#[tokio::test(start_paused = true)]
async fn max_open_bounds_leased_connections() {
    let harness = Harness::new();
    let pool = harness
        .builder()
        .max_open(1)
        .acquire_timeout(Duration::from_secs(1))
        .build();

    let held = pool.get("X").await.unwrap();
    let err = pool.get("X").await.unwrap_err();
    assert!(matches!(err, PoolError::Exhausted { .. }));

    held.close().unwrap();
    pool.get("X").await.unwrap();
    assert_eq!(harness.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn max_open_evicts_idle_connection_of_other_address() {
    let harness = Harness::new();
    let pool = harness
        .builder()
        .max_open(1)
        .acquire_timeout(Duration::from_secs(1))
        .build();

    let a = pool.get("a").await.unwrap();
    let a_id = *a;
    a.close().unwrap();
    assert_eq!(pool.idle_count("a"), 1);

    let b = pool.get("b").await.unwrap();
    assert_ne!(*b, a_id);
    assert_eq!(pool.idle_count("a"), 0);
    assert_eq!(harness.closed(), vec![a_id]);

    // The slot is still held by the lease, so nothing is left to evict.
    let err = pool.get("c").await.unwrap_err();
    assert!(matches!(err, PoolError::Exhausted { .. }));
}
