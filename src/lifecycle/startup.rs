//! Lifecycle runner.
//!
//! # Responsibilities
//! - Launch `run` for every component that reports `can_run`
//! - One task per component on the multi-threaded runtime
//! - Report the first failure; let the rest keep running
//!
//! # Design Decisions
//! - No ordering among peers: all runs start together
//! - Panics inside `run` are caught and reported as component errors
//! - Results flow through the fan-in channel, so a caller that returns on the
//!   first error never leaves a task blocked on reporting

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::component::Registry;
use crate::error::{ComponentError, ServiceError};
use crate::lifecycle::{fanin, Context};
use crate::observability::metrics;

/// Run every startable component until all return or one fails.
pub async fn run_components(registry: &Registry, ctx: &Context) -> Result<(), ServiceError> {
    let mut results = Vec::new();

    for (name, component) in registry.iter() {
        let Some(initializer) = component.initializer() else {
            continue;
        };
        if !initializer.can_run() {
            continue;
        }

        let name = name.to_string();
        let ctx = ctx.clone();
        tracing::info!(component = %name, "Starting component");

        results.push(fanin::spawn(async move {
            let outcome = AssertUnwindSafe(initializer.run(ctx))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(ComponentError::from_panic(panic)));

            match &outcome {
                Ok(()) => tracing::info!(component = %name, "Component finished"),
                Err(e) => tracing::error!(component = %name, error = %e, "Component failed"),
            }
            metrics::record_component_exit(&name, "run", outcome.is_ok());

            outcome.map_err(|source| ServiceError::Run {
                component: name,
                source,
            })
        }));
    }

    tracing::debug!(launched = results.len(), "Waiting for components");
    fanin::wait_for_error(fanin::merge(results)).await
}
