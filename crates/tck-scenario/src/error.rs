//! Error types for scenarios
//!
//! A scenario body reports one of three things:
//! - an assertion mismatch ([`AssertionFailure`])
//! - the front end rejecting source it should accept
//! - a backend fault unrelated to the behavior under test

use tck_backend::FrontEndError;

/// Expected-vs-actual mismatch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.render())]
pub struct AssertionFailure {
    /// What was being checked
    pub description: String,
    /// Expected value, rendered
    pub expected: String,
    /// Actual value, rendered
    pub actual: String,
}

impl AssertionFailure {
    /// Create assertion failure
    pub fn new(
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Multi-line values are shown as two blocks, single values inline
    fn render(&self) -> String {
        if self.expected.contains('\n') || self.actual.contains('\n') {
            format!(
                "{}\n--- expected\n{}\n+++ actual\n{}",
                self.description, self.expected, self.actual
            )
        } else {
            format!("{}: expected {}, got {}", self.description, self.expected, self.actual)
        }
    }
}

/// Anything that stops a scenario from passing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    /// Check did not hold
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),

    /// Front end rejected source the scenario considers valid
    #[error("front end rejected source: {0}")]
    Rejected(FrontEndError),

    /// Backend faulted while executing the scenario
    #[error("{0}")]
    Backend(String),
}

impl From<FrontEndError> for ScenarioError {
    fn from(err: FrontEndError) -> Self {
        match err {
            FrontEndError::Syntax { .. } => Self::Rejected(err),
            FrontEndError::Internal(message) => Self::Backend(message),
        }
    }
}

/// Scenario catalog errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Name registered twice
    #[error("scenario already registered: {0}")]
    DuplicateScenario(String),

    /// Selection names a scenario that does not exist
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    /// Scenario name is blank
    #[error("scenario name must not be empty")]
    EmptyName,
}
