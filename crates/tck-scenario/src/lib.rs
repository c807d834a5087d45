//! TCK Scenario Layer
//!
//! Behavior scenarios written once against the abstract front-end
//! interface and shared by every backend variant.
//!
//! # Core Concepts
//!
//! - [`Scenario`]: required capabilities + async `run(handle)`
//! - [`FnScenario`]: closure-backed scenario from a registration call
//! - [`ScenarioCatalog`]: owner of all scenarios, hands out [`ScenarioSet`]s
//! - [`Outcome`]: `Passed | Failed | Skipped | BackendError`
//! - [`assert`]: non-panicking checks and the `rewrite_run` before/after helper
//!
//! # Example
//!
//! ```rust,ignore
//! use tck_scenario::{assert::{rewrite_run, SourceSpec}, ScenarioCatalog};
//! use tck_backend::CapabilitySet;
//!
//! let mut catalog = ScenarioCatalog::new();
//! catalog.register("AddImport", CapabilitySet::new(), |fe| {
//!     rewrite_run(fe, |unit| add_import(unit, "java.util.List"), &spec).map(|_| ())
//! })?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod assert;
pub mod catalog;
pub mod error;
pub mod outcome;
pub mod scenario;

// Re-exports
pub use catalog::{ScenarioCatalog, ScenarioSet, SELECT_ALL};
pub use error::{AssertionFailure, CatalogError, ScenarioError};
pub use outcome::Outcome;
pub use scenario::{FnScenario, Scenario, ScenarioBody, ScenarioResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
