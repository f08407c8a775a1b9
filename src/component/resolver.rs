//! Dependency resolution pass.

use std::collections::HashSet;

use crate::component::{Dependency, Registry};
use crate::error::ServiceError;

/// How unregistered dependency names are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Inject `Dependency::Missing` and keep going.
    #[default]
    Lenient,
    /// Fail resolution with `ServiceError::MissingDependency`.
    Strict,
}

/// Inject every declared dependency into its initializer.
///
/// Walks the registry once. Repeated names in a declaration are injected
/// only once.
pub fn resolve(registry: &Registry, policy: MissingPolicy) -> Result<(), ServiceError> {
    for (name, component) in registry.iter() {
        let Some(initializer) = component.initializer() else {
            continue;
        };

        for dependency_name in unique(initializer.dependencies()) {
            let dependency = match registry.get(&dependency_name) {
                Some(peer) => peer.clone().dependency(),
                None if policy == MissingPolicy::Strict => {
                    return Err(ServiceError::MissingDependency {
                        component: name.to_string(),
                        dependency: dependency_name,
                    });
                }
                None => {
                    tracing::warn!(
                        component = %name,
                        dependency = %dependency_name,
                        "Dependency not registered, injecting empty value"
                    );
                    Dependency::Missing(dependency_name.clone())
                }
            };

            tracing::debug!(
                component = %name,
                dependency = %dependency_name,
                role = ?dependency.role(),
                "Injecting dependency"
            );

            initializer
                .add_dependency(dependency)
                .map_err(|source| ServiceError::Injection {
                    component: name.to_string(),
                    dependency: dependency_name,
                    source,
                })?;
        }
    }

    Ok(())
}

/// Drop repeated names, keeping the first occurrence.
fn unique(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
