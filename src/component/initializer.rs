//! The capability contract every subsystem implements to take part in
//! orchestrated startup and shutdown.

use std::sync::Arc;

use async_trait::async_trait;

use crate::component::Dependency;
use crate::error::ComponentError;
use crate::lifecycle::Context;

/// Lifecycle behavior of a component.
///
/// Every method has a default so adapters only override what they support.
/// A component may rely on its declared dependencies having been injected
/// before `run`, but not on any ordering among its peers' `run` calls.
#[async_trait]
pub trait Initializer: Send + Sync {
    /// Names of the registered components this one needs injected.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Receive one resolved dependency.
    fn add_dependency(&self, _dependency: Dependency) -> Result<(), ComponentError> {
        Ok(())
    }

    fn can_run(&self) -> bool {
        false
    }

    /// Do the component's work. Long-lived components block here until
    /// `ctx` is cancelled.
    async fn run(&self, _ctx: Context) -> Result<(), ComponentError> {
        Ok(())
    }

    fn can_stop(&self) -> bool {
        false
    }

    /// Release resources. Expected to return well before `ctx.deadline()`.
    async fn stop(&self, _ctx: Context) -> Result<(), ComponentError> {
        Ok(())
    }
}

/// A named unit of capability held by the service registry.
pub trait Component: Send + Sync + 'static {
    /// Lifecycle hooks, `None` when the component has no lifecycle needs.
    fn initializer(&self) -> Option<Arc<dyn Initializer>>;

    fn has_initializer(&self) -> bool {
        self.initializer().is_some()
    }

    /// The variant under which this component is injected into its peers.
    fn dependency(self: Arc<Self>) -> Dependency;
}
