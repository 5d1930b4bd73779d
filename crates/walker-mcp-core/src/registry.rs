//! Capability registry: the set of operations the process serves.
//!
//! The registry is filled once at startup and then frozen behind an `Arc`;
//! the serving layer never gets mutable access to it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::OperationDescriptor;
use crate::{Error, Result};

/// Name-indexed collection of operation descriptors.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    /// Descriptors in registration order
    operations: Vec<Arc<OperationDescriptor>>,
    /// Name to position in `operations`
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation.
    ///
    /// Fails with [`Error::InvalidDescriptor`] for a blank name and with
    /// [`Error::DuplicateOperation`] if the name is already taken.
    pub fn register(&mut self, descriptor: OperationDescriptor) -> Result<()> {
        let name = descriptor.name();
        if name.trim().is_empty() {
            return Err(Error::InvalidDescriptor(
                "operation name cannot be empty".to_string(),
            ));
        }
        if self.index.contains_key(name) {
            return Err(Error::DuplicateOperation(name.to_string()));
        }

        self.index.insert(name.to_string(), self.operations.len());
        self.operations.push(Arc::new(descriptor));
        Ok(())
    }

    /// Look up an operation by exact name.
    pub fn resolve(&self, name: &str) -> Result<Arc<OperationDescriptor>> {
        self.index
            .get(name)
            .map(|&position| Arc::clone(&self.operations[position]))
            .ok_or_else(|| Error::OperationNotFound(name.to_string()))
    }

    /// Whether an operation with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered descriptors, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.iter().map(|descriptor| descriptor.as_ref())
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Freeze the registry for serving.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Arguments, OperationHandler};
    use async_trait::async_trait;

    struct Constant(&'static str);

    #[async_trait]
    impl OperationHandler for Constant {
        async fn invoke(&self, _arguments: Arguments) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn descriptor(name: &str) -> OperationDescriptor {
        OperationDescriptor::new(name, "test operation", Constant("ok"))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = CapabilityRegistry::new();
        registry.register(descriptor("alpha")).unwrap();

        let resolved = registry.resolve("alpha").unwrap();
        assert_eq!(resolved.name(), "alpha");
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("alpha"));
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = CapabilityRegistry::new();
        let err = registry.resolve("does_not_exist").unwrap_err();
        assert!(matches!(err, Error::OperationNotFound(ref name) if name == "does_not_exist"));
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let mut registry = CapabilityRegistry::new();
        registry.register(descriptor("alpha")).unwrap();
        assert!(registry.resolve("Alpha").is_err());
        assert!(registry.resolve("alpha ").is_err());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = CapabilityRegistry::new();
        registry.register(descriptor("alpha")).unwrap();

        let err = registry.register(descriptor("alpha")).unwrap_err();
        assert!(matches!(err, Error::DuplicateOperation(ref name) if name == "alpha"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = CapabilityRegistry::new();
        let err = registry.register(descriptor("  ")).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_descriptors_keep_registration_order() {
        let mut registry = CapabilityRegistry::new();
        for name in ["zeta", "alpha", "mu"] {
            registry.register(descriptor(name)).unwrap();
        }
        let names: Vec<&str> = registry.descriptors().map(|d| d.name()).collect();
        assert_eq!(names, ["zeta", "alpha", "mu"]);
    }

    #[tokio::test]
    async fn test_shared_registry_resolves_handler() {
        let mut registry = CapabilityRegistry::new();
        registry.register(descriptor("alpha")).unwrap();
        let registry = registry.into_shared();

        let output = registry
            .resolve("alpha")
            .unwrap()
            .handler()
            .invoke(Arguments::new())
            .await
            .unwrap();
        assert_eq!(output, "ok");
    }
}
