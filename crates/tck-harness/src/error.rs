//! Error types for harness setup
//!
//! Only configuration problems are errors at this level. Everything that
//! happens while scenarios execute is folded into an
//! [`Outcome`](tck_scenario::Outcome).

use std::path::PathBuf;
use tck_backend::{BackendId, RegistryError};
use tck_scenario::CatalogError;

/// Fatal setup error, raised before any scenario runs
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Plan has no bindings
    #[error("harness plan has no bindings")]
    EmptyPlan,

    /// Two bindings share a name
    #[error("duplicate binding name: {0}")]
    DuplicateBinding(String),

    /// Binding built without a scenario set
    #[error("binding {0} has no scenario set")]
    MissingScenarios(String),

    /// Binding built without a backend
    #[error("binding {0} has no backend")]
    MissingBackend(String),

    /// Binding selects no scenarios
    #[error("binding {0} selects no scenarios")]
    EmptyScenarioSet(String),

    /// Same (scenario, backend) pair bound twice
    #[error("scenario {scenario} is bound to {backend} by both {first} and {second}")]
    DuplicatePair {
        /// Scenario name
        scenario: String,
        /// Backend id
        backend: BackendId,
        /// First binding
        first: String,
        /// Second binding
        second: String,
    },

    /// Concurrency limit of zero
    #[error("concurrency limit must be at least 1")]
    InvalidConcurrency,

    /// Zero scenario timeout
    #[error("scenario timeout must be positive")]
    InvalidTimeout,

    /// Scenario filter is not a valid regular expression
    #[error("invalid scenario filter '{pattern}': {source}")]
    InvalidFilter {
        /// Offending pattern
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },

    /// Configuration names a backend nobody registered
    #[error("unknown backend: {0}")]
    UnknownBackend(BackendId),

    /// Backend id or registration problem
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Scenario selection problem
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Configuration file could not be read
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
