//! Shutdown coordination.
//!
//! Every stoppable component gets its own task and, when a deadline is
//! configured, is abandoned once it expires. Failures and abandonments are
//! collected rather than short-circuiting, so one bad component never keeps
//! the others from being asked to stop.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;

use crate::component::Registry;
use crate::error::{ComponentError, StopFailure};
use crate::lifecycle::{fanin, Context};
use crate::observability::metrics;

/// Outcome of a shutdown pass.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Number of components asked to stop.
    pub attempted: usize,
    pub failures: Vec<StopFailure>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> impl Iterator<Item = &StopFailure> {
        self.failures.iter().filter(|f| !f.is_abandoned())
    }

    pub fn abandoned(&self) -> impl Iterator<Item = &StopFailure> {
        self.failures.iter().filter(|f| f.is_abandoned())
    }
}

impl fmt::Display for ShutdownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} components did not stop cleanly",
            self.failures.len(),
            self.attempted
        )?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

/// Stop every stoppable component concurrently.
///
/// `timeout` of `None` waits indefinitely for each component.
pub async fn stop_components(
    registry: &Registry,
    ctx: &Context,
    timeout: Option<Duration>,
) -> ShutdownReport {
    let mut results = Vec::new();

    for (name, component) in registry.iter() {
        let Some(initializer) = component.initializer() else {
            continue;
        };
        if !initializer.can_stop() {
            continue;
        }

        let name = name.to_string();
        let ctx = match timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.clone(),
        };
        tracing::info!(component = %name, "Stopping component");

        results.push(fanin::spawn(async move {
            let stop = tokio::spawn(async move {
                AssertUnwindSafe(initializer.stop(ctx))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(ComponentError::from_panic(panic)))
            });

            let outcome = match timeout {
                Some(limit) => match tokio::time::timeout(limit, stop).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        // Dropping the handle detaches the task.
                        tracing::error!(component = %name, timeout = ?limit, "Component abandoned");
                        metrics::record_component_exit(&name, "stop", false);
                        return Err(StopFailure::Abandoned {
                            component: name,
                            timeout: limit,
                        });
                    }
                },
                None => stop.await,
            };

            let outcome = outcome.unwrap_or_else(|join| {
                Err(ComponentError::msg(format!("stop task failed: {join}")))
            });
            metrics::record_component_exit(&name, "stop", outcome.is_ok());

            match outcome {
                Ok(()) => {
                    tracing::info!(component = %name, "Component stopped");
                    Ok(())
                }
                Err(source) => {
                    tracing::error!(component = %name, error = %source, "Component failed to stop");
                    Err(StopFailure::Failed {
                        component: name,
                        source,
                    })
                }
            }
        }));
    }

    let attempted = results.len();
    let failures = fanin::collect_errors(fanin::merge(results)).await;

    ShutdownReport {
        attempted,
        failures,
    }
}
