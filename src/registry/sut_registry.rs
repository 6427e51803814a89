//! SUT registry: maps stable ids to factory closures.
//!
//! The registry holds no execution state of its own; concurrency discipline
//! is "immutable after population" — the same discipline
//! `session::SessionManager` uses for its `parking_lot::RwLock<HashMap<..>>`
//! tables, generalized here from mutable session state to a read-mostly
//! catalog of factories.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::RegistryError;
use crate::model::{ConfigOverlay, Sut, SutFactory, SutRole, SutSpec};

struct Entry {
    spec: SutSpec,
    factory: SutFactory,
}

/// Registry of SUT specifications and their instance factories.
#[derive(Default)]
pub struct SutRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl SutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a SUT spec with its factory. Fails if `spec.id` is already
    /// registered.
    pub fn register(&self, spec: SutSpec, factory: SutFactory) -> Result<(), RegistryError> {
        let mut entries = self.entries.write();
        if entries.contains_key(&spec.id) {
            return Err(RegistryError::DuplicateRegistration(spec.id.clone()));
        }
        let id = spec.id.clone();
        entries.insert(id, Entry { spec, factory });
        Ok(())
    }

    /// Register many (spec, factory) pairs; stops at the first duplicate.
    pub fn register_all(
        &self,
        items: Vec<(SutSpec, SutFactory)>,
    ) -> Result<(), RegistryError> {
        for (spec, factory) in items {
            self.register(spec, factory)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<SutSpec> {
        self.entries.read().get(id).map(|e| e.spec.clone())
    }

    pub fn get_or_throw(&self, id: &str) -> Result<SutSpec, RegistryError> {
        self.get(id).ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Build an executable instance via the stored factory.
    pub fn create(
        &self,
        id: &str,
        config_override: Option<&ConfigOverlay>,
    ) -> Result<Box<dyn Sut>, RegistryError> {
        let entries = self.entries.read();
        let entry = entries
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        Ok((entry.factory)(config_override))
    }

    pub fn list(&self) -> Vec<SutSpec> {
        self.entries.read().values().map(|e| e.spec.clone()).collect()
    }

    pub fn list_by_role(&self, role: SutRole) -> Vec<SutSpec> {
        self.entries
            .read()
            .values()
            .filter(|e| e.spec.role == role)
            .map(|e| e.spec.clone())
            .collect()
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SutOutcome, SutRunError};

    struct Dummy(String);
    impl Sut for Dummy {
        fn id(&self) -> &str {
            &self.0
        }
        fn run(&self, _inputs: &serde_json::Value) -> Result<SutOutcome, SutRunError> {
            Ok(SutOutcome::default())
        }
    }

    fn spec(id: &str, role: SutRole) -> SutSpec {
        SutSpec {
            id: id.to_string(),
            name: id.to_string(),
            version: "1.0.0".to_string(),
            role,
            config_defaults: Default::default(),
            tags: vec![],
        }
    }

    #[test]
    fn duplicate_register_fails() {
        let reg = SutRegistry::new();
        reg.register(
            spec("alg-v1.0.0", SutRole::Primary),
            Box::new(|_| Box::new(Dummy("alg-v1.0.0".to_string()))),
        )
        .unwrap();

        let err = reg
            .register(
                spec("alg-v1.0.0", SutRole::Primary),
                Box::new(|_| Box::new(Dummy("alg-v1.0.0".to_string()))),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration(_)));
    }

    #[test]
    fn create_builds_instance_with_matching_id() {
        let reg = SutRegistry::new();
        reg.register(
            spec("alg-v1.0.0", SutRole::Primary),
            Box::new(|_| Box::new(Dummy("alg-v1.0.0".to_string()))),
        )
        .unwrap();

        let instance = reg.create("alg-v1.0.0", None).unwrap();
        assert_eq!(instance.id(), "alg-v1.0.0");
    }

    #[test]
    fn list_by_role_filters() {
        let reg = SutRegistry::new();
        reg.register(
            spec("alg-v1.0.0", SutRole::Primary),
            Box::new(|_| Box::new(Dummy("alg-v1.0.0".to_string()))),
        )
        .unwrap();
        reg.register(
            spec("base-v1.0.0", SutRole::Baseline),
            Box::new(|_| Box::new(Dummy("base-v1.0.0".to_string()))),
        )
        .unwrap();

        assert_eq!(reg.list_by_role(SutRole::Primary).len(), 1);
        assert_eq!(reg.list_by_role(SutRole::Baseline).len(), 1);
        assert_eq!(reg.size(), 2);
    }

    #[test]
    fn get_or_throw_on_missing_id() {
        let reg = SutRegistry::new();
        assert!(matches!(
            reg.get_or_throw("missing"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn clear_empties_registry() {
        let reg = SutRegistry::new();
        reg.register(
            spec("alg-v1.0.0", SutRole::Primary),
            Box::new(|_| Box::new(Dummy("alg-v1.0.0".to_string()))),
        )
        .unwrap();
        reg.clear();
        assert_eq!(reg.size(), 0);
        assert!(!reg.has("alg-v1.0.0"));
    }
}
