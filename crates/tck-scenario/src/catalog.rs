//! Shared scenario catalog
//!
//! The catalog owns every registered scenario. Bindings never see the
//! catalog itself, only a [`ScenarioSet`] selected from it.

use crate::error::CatalogError;
use crate::scenario::{FnScenario, Scenario, ScenarioResult};
use indexmap::IndexMap;
use std::sync::Arc;
use tck_backend::{CapabilitySet, FrontEnd};

/// Selector that picks the whole catalog
pub const SELECT_ALL: &str = "*";

/// Registered scenarios in registration order
#[derive(Debug, Default)]
pub struct ScenarioCatalog {
    scenarios: IndexMap<String, Arc<dyn Scenario>>,
}

impl ScenarioCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure scenario
    ///
    /// # Errors
    /// - `CatalogError::EmptyName` for a blank name
    /// - `CatalogError::DuplicateScenario` if the name is taken
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        required: CapabilitySet,
        body: F,
    ) -> Result<&mut Self, CatalogError>
    where
        F: Fn(&dyn FrontEnd) -> ScenarioResult + Send + Sync + 'static,
    {
        self.register_scenario(Arc::new(FnScenario::new(name, required, body)))?;
        Ok(self)
    }

    /// Register any scenario implementation
    ///
    /// # Errors
    /// - `CatalogError::EmptyName` for a blank name
    /// - `CatalogError::DuplicateScenario` if the name is taken
    pub fn register_scenario(&mut self, scenario: Arc<dyn Scenario>) -> Result<(), CatalogError> {
        let name = scenario.name().trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.scenarios.contains_key(name) {
            return Err(CatalogError::DuplicateScenario(name.to_string()));
        }
        self.scenarios.insert(name.to_string(), scenario);
        Ok(())
    }

    /// Look up scenario by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Scenario>> {
        self.scenarios.get(name)
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    /// Scenarios in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Scenario>> {
        self.scenarios.values()
    }

    /// Number of scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Every scenario, as a named set
    #[must_use]
    pub fn all(&self, label: impl Into<String>) -> ScenarioSet {
        ScenarioSet::new(label, self.scenarios.values().cloned().collect())
    }

    /// Named subset; `"*"` anywhere in `names` selects the whole catalog
    ///
    /// Order follows `names`, duplicates are dropped.
    ///
    /// # Errors
    /// Returns `CatalogError::UnknownScenario` for names not in the catalog.
    pub fn select<I, S>(&self, label: impl Into<String>, names: I) -> Result<ScenarioSet, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut picked: IndexMap<&str, Arc<dyn Scenario>> = IndexMap::new();
        for name in names {
            let name = name.as_ref();
            if name == SELECT_ALL {
                return Ok(self.all(label));
            }
            let (key, scenario) = self
                .scenarios
                .get_key_value(name)
                .ok_or_else(|| CatalogError::UnknownScenario(name.to_string()))?;
            picked.entry(key.as_str()).or_insert_with(|| Arc::clone(scenario));
        }
        Ok(ScenarioSet::new(label, picked.into_values().collect()))
    }
}

/// Immutable, named list of catalog scenarios
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    name: String,
    scenarios: Arc<[Arc<dyn Scenario>]>,
}

impl ScenarioSet {
    /// Create set from scenarios
    #[must_use]
    pub fn new(name: impl Into<String>, scenarios: Vec<Arc<dyn Scenario>>) -> Self {
        Self {
            name: name.into(),
            scenarios: scenarios.into(),
        }
    }

    /// Set label
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenarios in set order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Scenario>> {
        self.scenarios.iter()
    }

    /// Number of scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ScenarioCatalog {
        let mut catalog = ScenarioCatalog::new();
        catalog
            .register("A", CapabilitySet::new(), |_| Ok(()))
            .unwrap()
            .register("B", CapabilitySet::new().with("x"), |_| Ok(()))
            .unwrap()
            .register("C", CapabilitySet::new(), |_| Ok(()))
            .unwrap();
        catalog
    }

    #[test]
    fn keeps_registration_order() {
        let names: Vec<_> = catalog().names().map(str::to_string).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn rejects_duplicate_and_blank_names() {
        let mut catalog = catalog();
        let dup = catalog.register("A", CapabilitySet::new(), |_| Ok(()));
        assert!(matches!(dup, Err(CatalogError::DuplicateScenario(name)) if name == "A"));

        let blank = catalog.register("  ", CapabilitySet::new(), |_| Ok(()));
        assert!(matches!(blank, Err(CatalogError::EmptyName)));
    }

    #[test]
    fn select_subset_in_requested_order() {
        let set = catalog().select("imports", ["C", "A", "C"]).unwrap();
        let names: Vec<_> = set.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["C", "A"]);
        assert_eq!(set.name(), "imports");
    }

    #[test]
    fn select_wildcard_is_everything() {
        let set = catalog().select("all", [SELECT_ALL]).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn select_unknown_fails() {
        let err = catalog().select("x", ["Nope"]).unwrap_err();
        assert_eq!(err, CatalogError::UnknownScenario("Nope".into()));
    }
}
