//! Named component registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::component::Component;
use crate::error::ServiceError;

/// Mapping from component name to component.
///
/// Populated while the service is being built and never mutated afterwards.
#[derive(Default)]
pub struct Registry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under a unique name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        component: Arc<dyn Component>,
    ) -> Result<(), ServiceError> {
        let name = name.into();
        if self.components.contains_key(&name) {
            return Err(ServiceError::DuplicateComponent(name));
        }
        self.components.insert(name, component);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Component>> {
        self.components.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Component>)> {
        self.components
            .iter()
            .map(|(name, component)| (name.as_str(), component))
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Dependency, Initializer, Role};

    struct Plain;

    impl Component for Plain {
        fn initializer(&self) -> Option<Arc<dyn Initializer>> {
            None
        }

        fn dependency(self: Arc<Self>) -> Dependency {
            Dependency::Component {
                role: Role::KvStore,
                component: self,
            }
        }
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut registry = Registry::new();
        registry.insert("kv", Arc::new(Plain)).unwrap();

        let err = registry.insert("kv", Arc::new(Plain)).unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateComponent(name) if name == "kv"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["kv"]);
    }

    #[test]
    fn lookup_by_name() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.insert("kv", Arc::new(Plain)).unwrap();

        assert!(registry.contains("kv"));
        assert!(registry.get("missing").is_none());
        let component = registry.get("kv").unwrap();
        assert!(!component.has_initializer());
        assert_eq!(component.clone().dependency().role(), Some(Role::KvStore));
    }
}
