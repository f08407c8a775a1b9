//! The service façade driving the component lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::component::resolver::{self, MissingPolicy};
use crate::component::Registry;
use crate::error::ServiceError;
use crate::lifecycle::{shutdown, signals, startup, Context};

/// A set of registered components and the token that ends their lives.
#[derive(Debug)]
pub struct Service {
    name: String,
    registry: Registry,
    token: CancellationToken,
    policy: MissingPolicy,
    stop_timeout: Option<Duration>,
    initialized: AtomicBool,
    /// Set once every dependency was injected.
    resolved: AtomicBool,
    running: AtomicBool,
    stopped: AtomicBool,
}

impl Service {
    pub(crate) fn new(
        name: String,
        registry: Registry,
        token: CancellationToken,
        policy: MissingPolicy,
        stop_timeout: Option<Duration>,
    ) -> Self {
        Self {
            name,
            registry,
            token,
            policy,
            stop_timeout,
            initialized: AtomicBool::new(false),
            resolved: AtomicBool::new(false),
            running: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Token cancelled when the service shuts down.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// A run context bound to the service token.
    pub fn context(&self) -> Context {
        Context::new(self.token.clone())
    }

    /// Inject every declared dependency. Runs once, even when it fails.
    pub fn init(&self) -> Result<(), ServiceError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(ServiceError::AlreadyInitialized);
        }

        tracing::info!(
            service = %self.name,
            components = ?self.registry.names(),
            "Resolving dependencies"
        );
        resolver::resolve(&self.registry, self.policy)?;
        self.resolved.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Run every startable component until all return or one fails.
    ///
    /// Initializes first when `init` has not been called. Refuses to run
    /// after a failed `init`.
    pub async fn run(&self) -> Result<(), ServiceError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ServiceError::AlreadyRunning);
        }
        if !self.initialized.load(Ordering::SeqCst) {
            self.init()?;
        } else if !self.resolved.load(Ordering::SeqCst) {
            return Err(ServiceError::NotInitialized);
        }

        tracing::info!(service = %self.name, "Running components");
        startup::run_components(&self.registry, &self.context()).await
    }

    /// Cancel the service token and stop every stoppable component.
    ///
    /// Only the first call does any work.
    pub async fn stop(&self) -> Result<(), ServiceError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!(service = %self.name, "Stop already performed");
            return Ok(());
        }

        self.token.cancel();
        tracing::info!(service = %self.name, timeout = ?self.stop_timeout, "Stopping components");

        let report = shutdown::stop_components(&self.registry, &self.context(), self.stop_timeout).await;
        if report.is_clean() {
            tracing::info!(service = %self.name, stopped = report.attempted, "Shutdown complete");
            Ok(())
        } else {
            tracing::error!(
                service = %self.name,
                failed = report.failed().count(),
                abandoned = report.abandoned().count(),
                "Shutdown finished with errors"
            );
            Err(ServiceError::Shutdown(report))
        }
    }

    /// Wait for a shutdown signal or token cancellation, then stop.
    pub async fn shutdown_on_signal(&self) -> Result<(), ServiceError> {
        signals::cancel_on_signal(self.token.clone())
            .await
            .map_err(ServiceError::Signal)?;
        self.stop().await
    }

    /// Initialize, run, and stop on the first signal or cancellation.
    ///
    /// When every component's `run` has returned, the token is cancelled so
    /// the service shuts down on its own. A run failure takes precedence
    /// over a shutdown failure in the returned error.
    pub async fn serve(&self) -> Result<(), ServiceError> {
        self.init()?;

        let run = async {
            let result = self.run().await;
            if let Err(e) = &result {
                tracing::error!(service = %self.name, error = %e, "Run failed, shutting down");
            }
            self.token.cancel();
            result
        };

        let (run, shutdown) = tokio::join!(run, self.shutdown_on_signal());
        run?;
        shutdown
    }
}
