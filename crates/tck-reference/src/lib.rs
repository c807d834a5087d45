//! TCK Reference Backends
//!
//! Four dialects of a toy Java-like front end plus a sample catalog, so the
//! harness has real variants to multiply across.
//!
//! | backend   | capabilities                                   |
//! |-----------|------------------------------------------------|
//! | `java@8`  | none                                           |
//! | `java@11` | `supports-var-inference`                       |
//! | `java@17` | + `supports-text-blocks`, `supports-records`   |
//! | `java@21` | + `supports-pattern-switch`                    |
//!
//! The default plan runs `java@8` and `java@11` on every invocation and
//! keeps the two newest dialects in the extended tier.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod dialect;
pub mod front_end;
pub mod recipes;
pub mod scenarios;

use std::sync::Arc;
use tck_backend::{BackendRegistry, RegistryError};
use tck_harness::{BindingSpec, ConfigError, HarnessConfig, HarnessPlan, RunSection, Tier};
use tck_scenario::{ScenarioCatalog, SELECT_ALL};

// Re-exports
pub use dialect::{Dialect, JavaBackend};
pub use front_end::JavaFrontEnd;
pub use scenarios::catalog;

/// Registry with every reference dialect
///
/// # Errors
/// Returns `RegistryError::Duplicate` if a dialect id is registered twice.
pub fn registry() -> Result<BackendRegistry, RegistryError> {
    let mut registry = BackendRegistry::new();
    for dialect in Dialect::ALL {
        registry.register(JavaBackend::new(dialect))?;
    }
    Ok(registry)
}

/// Tier of the default binding for `dialect`
#[must_use]
pub fn default_tier(dialect: Dialect) -> Tier {
    if dialect >= Dialect::Java17 {
        Tier::Extended
    } else {
        Tier::Default
    }
}

/// One binding per dialect over the whole catalog
#[must_use]
pub fn default_config() -> HarnessConfig {
    HarnessConfig {
        run: RunSection::default(),
        bindings: Dialect::ALL
            .into_iter()
            .map(|dialect| BindingSpec {
                name: format!("java{}", dialect.version()),
                backend: dialect.id().to_string(),
                tier: default_tier(dialect),
                scenarios: vec![SELECT_ALL.to_string()],
            })
            .collect(),
    }
}

/// [`default_config`] resolved against a catalog and registry
///
/// # Errors
/// Returns `ConfigError` if the registry lacks a dialect.
pub fn default_plan(
    catalog: &ScenarioCatalog,
    registry: &Arc<BackendRegistry>,
) -> Result<HarnessPlan, ConfigError> {
    default_config().to_plan(catalog, registry)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
