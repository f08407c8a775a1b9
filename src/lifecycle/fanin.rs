//! Error fan-in for concurrently launched single-shot operations.
//!
//! Every producer is a `oneshot` receiver, so it can deliver at most one
//! result. [`merge`] forwards all of them into one channel whose capacity
//! equals the number of producers: a forwarder never waits for room, even
//! after the consumer has stopped reading.

use std::future::Future;

use tokio::sync::{mpsc, oneshot};

/// Launch `fut` on the runtime and return the receiver for its single result.
pub fn spawn<F>(fut: F) -> oneshot::Receiver<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        // Receiver gone means nobody cares about the result anymore.
        let _ = tx.send(fut.await);
    });
    rx
}

/// Merge N single-shot producers into one stream sized for all N results.
///
/// A producer dropped without sending counts as finished without error.
pub fn merge<E>(sources: Vec<oneshot::Receiver<Result<(), E>>>) -> mpsc::Receiver<Result<(), E>>
where
    E: Send + 'static,
{
    let (tx, rx) = mpsc::channel(sources.len().max(1));

    for source in sources {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Ok(result) = source.await {
                // Capacity covers every source; only a closed receiver fails here.
                let _ = tx.try_send(result);
            }
        });
    }

    rx
}

/// Return the first error observed, or `Ok(())` once every producer finished.
pub async fn wait_for_error<E>(mut results: mpsc::Receiver<Result<(), E>>) -> Result<(), E> {
    while let Some(result) = results.recv().await {
        result?;
    }
    Ok(())
}

/// Drain every result and keep the errors, in arrival order.
pub async fn collect_errors<E>(mut results: mpsc::Receiver<Result<(), E>>) -> Vec<E> {
    let mut errors = Vec::new();
    while let Some(result) = results.recv().await {
        if let Err(e) = result {
            errors.push(e);
        }
    }
    errors
}
