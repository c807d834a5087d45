//! Scenario outcomes

use crate::error::ScenarioError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tck_backend::Capability;

/// Result of one (scenario, backend) execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Ran and every check held
    Passed,
    /// Ran and a check failed, timed out or panicked
    Failed(String),
    /// Not run (missing capability)
    Skipped(String),
    /// Backend unavailable or faulted
    BackendError(String),
}

impl Outcome {
    /// Fold a scenario body result into an outcome
    #[must_use]
    pub fn from_result(result: Result<(), ScenarioError>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(err @ (ScenarioError::Assertion(_) | ScenarioError::Rejected(_))) => {
                Self::Failed(err.to_string())
            }
            Err(ScenarioError::Backend(detail)) => Self::BackendError(detail),
        }
    }

    /// Skip caused by capabilities the backend lacks
    #[must_use]
    pub fn missing_capabilities(missing: &[Capability]) -> Self {
        let names: Vec<&str> = missing.iter().map(Capability::name).collect();
        Self::Skipped(format!("missing capability: {}", names.join(", ")))
    }

    /// Check if this outcome should fail the run
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::BackendError(_))
    }

    /// Short status label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed(_) => "FAILED",
            Self::Skipped(_) => "SKIPPED",
            Self::BackendError(_) => "BACKEND_ERROR",
        }
    }

    /// Detail text, if any
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed(d) | Self::Skipped(d) | Self::BackendError(d) => Some(d),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{} ({})", self.label(), detail),
            None => f.write_str(self.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssertionFailure;
    use tck_backend::FrontEndError;

    #[test]
    fn result_mapping() {
        assert_eq!(Outcome::from_result(Ok(())), Outcome::Passed);

        let failed = Outcome::from_result(Err(AssertionFailure::new("x", "1", "2").into()));
        assert!(matches!(failed, Outcome::Failed(_)));

        let rejected = Outcome::from_result(Err(FrontEndError::syntax(1, "bad").into()));
        assert!(matches!(rejected, Outcome::Failed(_)));

        let fault = Outcome::from_result(Err(ScenarioError::Backend("crash".into())));
        assert_eq!(fault, Outcome::BackendError("crash".into()));
    }

    #[test]
    fn skip_reason_names_capabilities() {
        let outcome = Outcome::missing_capabilities(&[Capability::new("supports-pattern-switch")]);
        assert_eq!(
            outcome,
            Outcome::Skipped("missing capability: supports-pattern-switch".into())
        );
        assert!(!outcome.is_failure());
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_string(&Outcome::Failed("timeout".into())).unwrap();
        assert_eq!(json, r#"{"status":"failed","detail":"timeout"}"#);
        let json = serde_json::to_string(&Outcome::Passed).unwrap();
        assert_eq!(json, r#"{"status":"passed"}"#);
    }
}
