//! TCK Harness
//!
//! Multiplies a scenario catalog across backend variants and governs when
//! each multiplication runs.
//!
//! # Core Concepts
//!
//! - [`Binding`]: scenario set + exactly one backend + resolver + [`Tier`]
//! - [`HarnessPlan`]: validated bindings
//! - [`TierGate`]: decides which bindings run under a [`RunConfig`]
//! - [`HarnessRunner`]: executes the plan and aggregates a [`Report`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tck_harness::{Binding, HarnessPlan, HarnessRunner, RunConfig, Tier};
//!
//! let binding = Binding::builder("java21")
//!     .scenarios(catalog.all("all"))
//!     .backend(descriptor, registry.clone())
//!     .tier(Tier::Extended)
//!     .build()?;
//! let runner = HarnessRunner::new(HarnessPlan::new(vec![binding])?, RunConfig::default())?;
//! let report = runner.run().await;
//! std::process::exit(report.exit_code());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod binding;
pub mod config;
pub mod error;
pub mod observer;
pub mod report;
pub mod runner;
pub mod tier;

// Re-exports
pub use binding::{Binding, BindingBuilder, HarnessPlan};
pub use config::{BindingSpec, HarnessConfig, RunConfig, RunSection, DEFAULT_SCENARIO_TIMEOUT};
pub use error::ConfigError;
pub use observer::{ConsoleObserver, NoopObserver, RecordingObserver, RunObserver};
pub use report::{OutcomeKey, Report, Summary, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
pub use runner::HarnessRunner;
pub use tier::{StandardTierGate, Tier, TierGate};

/// Version of the harness crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
