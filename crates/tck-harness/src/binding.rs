//! Bindings and the harness plan
//!
//! A [`Binding`] is the only place a scenario set meets a backend. It holds
//! exactly one descriptor, so a scenario can never run against a backend it
//! was not explicitly bound to.

use crate::error::ConfigError;
use crate::tier::Tier;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tck_backend::{BackendDescriptor, BackendId, Resolver};
use tck_scenario::{Scenario, ScenarioSet};

/// Scenario set + one backend + resolver + tier
#[derive(Clone)]
pub struct Binding {
    name: String,
    scenarios: ScenarioSet,
    descriptor: BackendDescriptor,
    resolver: Arc<dyn Resolver>,
    tier: Tier,
}

impl Binding {
    /// Start building a binding
    #[must_use]
    pub fn builder(name: impl Into<String>) -> BindingBuilder {
        BindingBuilder {
            name: name.into(),
            scenarios: None,
            backend: None,
            tier: Tier::Default,
        }
    }

    /// Binding name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bound scenario set
    #[inline]
    #[must_use]
    pub fn scenarios(&self) -> &ScenarioSet {
        &self.scenarios
    }

    /// Bound backend
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    /// Resolver used for the bound backend
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    /// Execution tier
    #[inline]
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Every (scenario, descriptor) pair of this binding
    pub fn enumerate(&self) -> impl Iterator<Item = (&Arc<dyn Scenario>, &BackendDescriptor)> {
        self.scenarios.iter().map(move |s| (s, &self.descriptor))
    }

    /// Scenarios whose required capabilities the backend satisfies
    #[must_use]
    pub fn runnable_count(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| self.descriptor.capabilities.is_superset_of(s.required_capabilities()))
            .count()
    }

    /// True when every pair would be skipped
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.runnable_count() == 0
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("scenarios", &self.scenarios.name())
            .field("backend", &self.descriptor.id.to_string())
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Binding`]
pub struct BindingBuilder {
    name: String,
    scenarios: Option<ScenarioSet>,
    backend: Option<(BackendDescriptor, Arc<dyn Resolver>)>,
    tier: Tier,
}

impl BindingBuilder {
    /// Set scenario set
    #[must_use]
    pub fn scenarios(mut self, scenarios: ScenarioSet) -> Self {
        self.scenarios = Some(scenarios);
        self
    }

    /// Set backend descriptor and the resolver that serves it
    #[must_use]
    pub fn backend(mut self, descriptor: BackendDescriptor, resolver: Arc<dyn Resolver>) -> Self {
        self.backend = Some((descriptor, resolver));
        self
    }

    /// Set tier
    #[must_use]
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Finish the binding
    ///
    /// # Errors
    /// - `ConfigError::MissingScenarios` / `MissingBackend` if unset
    /// - `ConfigError::EmptyScenarioSet` if the set is empty
    pub fn build(self) -> Result<Binding, ConfigError> {
        let scenarios = self
            .scenarios
            .ok_or_else(|| ConfigError::MissingScenarios(self.name.clone()))?;
        let (descriptor, resolver) = self
            .backend
            .ok_or_else(|| ConfigError::MissingBackend(self.name.clone()))?;
        if scenarios.is_empty() {
            return Err(ConfigError::EmptyScenarioSet(self.name));
        }
        Ok(Binding {
            name: self.name,
            scenarios,
            descriptor,
            resolver,
            tier: self.tier,
        })
    }
}

/// Validated, ordered list of bindings
#[derive(Debug, Clone)]
pub struct HarnessPlan {
    bindings: Vec<Binding>,
}

impl HarnessPlan {
    /// Validate bindings into a plan
    ///
    /// # Errors
    /// - `ConfigError::EmptyPlan` for no bindings
    /// - `ConfigError::DuplicateBinding` for repeated names
    /// - `ConfigError::DuplicatePair` when two bindings cover the same
    ///   (scenario, backend) pair
    pub fn new(bindings: Vec<Binding>) -> Result<Self, ConfigError> {
        if bindings.is_empty() {
            return Err(ConfigError::EmptyPlan);
        }

        let mut names = HashSet::new();
        let mut pairs: HashMap<(&str, &BackendId), &str> = HashMap::new();
        for binding in &bindings {
            if !names.insert(binding.name()) {
                return Err(ConfigError::DuplicateBinding(binding.name().to_string()));
            }
            for (scenario, descriptor) in binding.enumerate() {
                if let Some(first) = pairs.insert((scenario.name(), &descriptor.id), binding.name()) {
                    return Err(ConfigError::DuplicatePair {
                        scenario: scenario.name().to_string(),
                        backend: descriptor.id.clone(),
                        first: first.to_string(),
                        second: binding.name().to_string(),
                    });
                }
            }
        }

        Ok(Self { bindings })
    }

    /// Bindings in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Look up binding by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    /// Number of bindings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Always false for a validated plan
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
