//! Case registry: maps case ids to lazily-loaded resources and per-run
//! argument structures.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::RegistryError;
use crate::model::{CaseDefinition, CaseInput, EvaluationCase};

/// Registry of case definitions. Resource caching is the caller's
/// responsibility (see `executor::cache`); the registry only holds the
/// factories.
#[derive(Default)]
pub struct CaseRegistry {
    entries: RwLock<HashMap<String, CaseDefinition>>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, definition: CaseDefinition) -> Result<(), RegistryError> {
        let mut entries = self.entries.write();
        let id = definition.case.case_id.clone();
        if entries.contains_key(&id) {
            return Err(RegistryError::DuplicateRegistration(id));
        }
        entries.insert(id, definition);
        Ok(())
    }

    /// Load the heavyweight resource for `case_id` by invoking its factory.
    /// Not cached here; at most once per call.
    pub fn get_input(&self, case_id: &str) -> Result<CaseInput, RegistryError> {
        let entries = self.entries.read();
        let def = entries
            .get(case_id)
            .ok_or_else(|| RegistryError::NotFound(case_id.to_string()))?;
        (def.get_input)().map_err(|message| RegistryError::ResourceLoadFailed {
            case_id: case_id.to_string(),
            message,
        })
    }

    pub fn get_inputs(&self, case_id: &str) -> Result<serde_json::Value, RegistryError> {
        let entries = self.entries.read();
        let def = entries
            .get(case_id)
            .ok_or_else(|| RegistryError::NotFound(case_id.to_string()))?;
        Ok((def.get_inputs)())
    }

    pub fn get_spec(&self, case_id: &str) -> Option<EvaluationCase> {
        self.entries.read().get(case_id).map(|d| d.case.clone())
    }

    pub fn get_by_class(&self, class: &str) -> Vec<EvaluationCase> {
        self.entries
            .read()
            .values()
            .filter(|d| d.case.case_class == class)
            .map(|d| d.case.clone())
            .collect()
    }

    pub fn get_by_tag(&self, tag: &str) -> Vec<EvaluationCase> {
        self.entries
            .read()
            .values()
            .filter(|d| d.case.tags.iter().any(|t| t == tag))
            .map(|d| d.case.clone())
            .collect()
    }

    pub fn list_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self
            .entries
            .read()
            .values()
            .map(|d| d.case.case_class.clone())
            .collect();
        classes.sort();
        classes.dedup();
        classes
    }

    pub fn has(&self, case_id: &str) -> bool {
        self.entries.read().contains_key(case_id)
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
    use serde_json::json;

    fn make_case(id: &str, class: &str) -> CaseDefinition {
        CaseDefinition {
            case: EvaluationCase {
                case_id: id.to_string(),
                name: id.to_string(),
                case_class: class.to_string(),
                inputs: json!({}),
                version: "1.0.0".to_string(),
                tags: vec!["social".to_string()],
            },
            get_input: Box::new(|| Ok(std::sync::Arc::new(json!({"nodes": 3})))),
            get_inputs: Box::new(|| json!({"k": 1})),
        }
    }

    #[test]
    fn register_and_load() {
        let reg = CaseRegistry::new();
        reg.register(make_case("case-1", "social")).unwrap();

        let input = reg.get_input("case-1").unwrap();
        assert_eq!(input["nodes"], 3);

        let inputs = reg.get_inputs("case-1").unwrap();
        assert_eq!(inputs["k"], 1);
    }

    #[test]
    fn duplicate_register_fails() {
        let reg = CaseRegistry::new();
        reg.register(make_case("case-1", "social")).unwrap();
        assert!(matches!(
            reg.register(make_case("case-1", "social")),
            Err(RegistryError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn get_by_class_and_tag() {
        let reg = CaseRegistry::new();
        reg.register(make_case("case-1", "social")).unwrap();
        reg.register(make_case("case-2", "citation")).unwrap();

        assert_eq!(reg.get_by_class("social").len(), 1);
        assert_eq!(reg.get_by_tag("social").len(), 2);
        assert_eq!(reg.list_classes(), vec!["citation", "social"]);
    }

    #[test]
    fn get_input_on_missing_case_errors() {
        let reg = CaseRegistry::new();
        assert!(matches!(
            reg.get_input("missing"),
            Err(RegistryError::NotFound(_))
        ));
    }
}
