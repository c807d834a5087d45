//! Tier gating
//!
//! Extended bindings (one full backend construction plus the whole catalog
//! per variant) only run when the run configuration asks for them.

use crate::binding::Binding;
use crate::config::RunConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Execution tier of a binding, and the tier a run requests
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Runs on every invocation
    #[default]
    Default,
    /// Runs only on request
    Extended,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Extended => f.write_str("extended"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "extended" => Ok(Self::Extended),
            other => Err(format!("unknown tier '{other}', expected default or extended")),
        }
    }
}

/// Decides whether a binding runs in the current invocation
pub trait TierGate: Send + Sync {
    /// Check if binding is enabled under `config`
    fn is_enabled(&self, binding: &Binding, config: &RunConfig) -> bool;
}

/// Default bindings always run; extended ones only when requested
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTierGate;

impl TierGate for StandardTierGate {
    fn is_enabled(&self, binding: &Binding, config: &RunConfig) -> bool {
        binding.tier() <= config.tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tck_backend::BackendRegistry;
    use tck_scenario::ScenarioCatalog;
    use tck_test_utils::descriptor;

    fn binding(tier: Tier) -> Binding {
        let mut catalog = ScenarioCatalog::new();
        catalog
            .register("S", Default::default(), |_| Ok(()))
            .unwrap();
        Binding::builder("b")
            .scenarios(catalog.all("all"))
            .backend(descriptor("java", "8", &[]), Arc::new(BackendRegistry::new()))
            .tier(tier)
            .build()
            .unwrap()
    }

    #[test]
    fn default_bindings_always_run() {
        let gate = StandardTierGate;
        let b = binding(Tier::Default);
        assert!(gate.is_enabled(&b, &RunConfig::default()));
        assert!(gate.is_enabled(&b, &RunConfig::default().with_extended(true)));
    }

    #[test]
    fn extended_bindings_need_opt_in() {
        let gate = StandardTierGate;
        let b = binding(Tier::Extended);
        assert!(!gate.is_enabled(&b, &RunConfig::default()));
        assert!(gate.is_enabled(&b, &RunConfig::default().with_extended(true)));
    }

    #[test]
    fn tier_parses_case_insensitively() {
        assert_eq!("Extended".parse::<Tier>().unwrap(), Tier::Extended);
        assert_eq!("default".parse::<Tier>().unwrap(), Tier::Default);
        assert!("nightly".parse::<Tier>().is_err());
    }
}
