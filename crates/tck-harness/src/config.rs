//! Run configuration and the declarative harness file
//!
//! [`RunConfig`] is the per-invocation surface (tier, concurrency, timeout,
//! filter). [`HarnessConfig`] is the TOML document that declares bindings so
//! the binding structure stays reviewable:
//!
//! ```toml
//! [run]
//! extended = false
//! concurrency = 4
//! timeout_ms = 30000
//!
//! [[binding]]
//! name = "java21"
//! backend = "java@21"
//! tier = "extended"
//! scenarios = ["*"]
//! ```

use crate::binding::{Binding, HarnessPlan};
use crate::error::ConfigError;
use crate::tier::Tier;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tck_backend::{BackendId, BackendRegistry, Resolver};
use tck_scenario::{ScenarioCatalog, SELECT_ALL};

/// Default per-scenario timeout
pub const DEFAULT_SCENARIO_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-invocation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Highest tier that runs
    pub tier: Tier,
    /// Maximum scenario executions in flight
    pub concurrency: usize,
    /// Per-scenario timeout
    pub scenario_timeout: Duration,
    /// Only scenarios whose name matches this regex
    pub filter: Option<String>,
}

impl RunConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With requested tier
    #[inline]
    #[must_use]
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Request (or not) the extended tier
    #[inline]
    #[must_use]
    pub fn with_extended(self, extended: bool) -> Self {
        self.with_tier(if extended { Tier::Extended } else { Tier::Default })
    }

    /// With concurrency limit
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit;
        self
    }

    /// With per-scenario timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.scenario_timeout = timeout;
        self
    }

    /// With scenario name filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, pattern: impl Into<String>) -> Self {
        self.filter = Some(pattern.into());
        self
    }

    /// Validate and compile the filter
    ///
    /// # Errors
    /// - `ConfigError::InvalidConcurrency` for a zero limit
    /// - `ConfigError::InvalidTimeout` for a zero timeout
    /// - `ConfigError::InvalidFilter` if the filter does not compile
    pub fn validate(&self) -> Result<Option<Regex>, ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if self.scenario_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        self.filter
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidFilter {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tier: Tier::Default,
            concurrency: std::thread::available_parallelism().map_or(4, NonZeroUsize::get),
            scenario_timeout: DEFAULT_SCENARIO_TIMEOUT,
            filter: None,
        }
    }
}

/// `[run]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Request the extended tier
    #[serde(default)]
    pub extended: bool,
    /// Concurrency limit
    pub concurrency: Option<usize>,
    /// Per-scenario timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Scenario name filter
    pub filter: Option<String>,
}

/// One `[[binding]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingSpec {
    /// Binding name
    pub name: String,
    /// Backend id, `name@version`
    pub backend: String,
    /// Execution tier
    #[serde(default)]
    pub tier: Tier,
    /// Scenario names, `"*"` for the whole catalog
    #[serde(default = "select_all")]
    pub scenarios: Vec<String>,
}

fn select_all() -> Vec<String> {
    vec![SELECT_ALL.to_string()]
}

/// Declarative harness configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Run settings
    #[serde(default)]
    pub run: RunSection,
    /// Bindings in declaration order
    #[serde(default, rename = "binding")]
    pub bindings: Vec<BindingSpec>,
}

impl HarnessConfig {
    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Io` or `ConfigError::Parse`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed documents.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Run settings, falling back to defaults for absent keys
    #[must_use]
    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::default().with_extended(self.run.extended);
        if let Some(limit) = self.run.concurrency {
            config = config.with_concurrency(limit);
        }
        if let Some(ms) = self.run.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(filter) = &self.run.filter {
            config = config.with_filter(filter.clone());
        }
        config
    }

    /// Build the plan against a catalog and a backend registry
    ///
    /// # Errors
    /// - `ConfigError::Registry` for malformed backend ids
    /// - `ConfigError::UnknownBackend` for ids not in `registry`
    /// - `ConfigError::Catalog` for unknown scenario names
    /// - any plan validation error
    pub fn to_plan(
        &self,
        catalog: &ScenarioCatalog,
        registry: &Arc<BackendRegistry>,
    ) -> Result<HarnessPlan, ConfigError> {
        let mut bindings = Vec::with_capacity(self.bindings.len());
        for spec in &self.bindings {
            let id: BackendId = spec.backend.parse()?;
            let descriptor = registry
                .describe(&id)
                .ok_or(ConfigError::UnknownBackend(id))?;
            let scenarios = catalog.select(spec.name.clone(), &spec.scenarios)?;
            let resolver: Arc<dyn Resolver> = registry.clone();
            bindings.push(
                Binding::builder(spec.name.clone())
                    .scenarios(scenarios)
                    .backend(descriptor, resolver)
                    .tier(spec.tier)
                    .build()?,
            );
        }
        HarnessPlan::new(bindings)
    }
}
