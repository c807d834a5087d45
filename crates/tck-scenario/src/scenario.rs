//! Behavior scenario contract
//!
//! A [`Scenario`] is expressed only against the abstract
//! [`FrontEnd`](tck_backend::FrontEnd) interface. It states which
//! capabilities it needs; the harness never invokes it against a backend
//! that lacks them.

use crate::error::ScenarioError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tck_backend::{BackendHandle, CapabilitySet, FrontEnd};

/// Result of a scenario body
pub type ScenarioResult = Result<(), ScenarioError>;

/// Synchronous scenario body
pub type ScenarioBody = Arc<dyn Fn(&dyn FrontEnd) -> ScenarioResult + Send + Sync>;

/// One reusable test case
///
/// Implementations must only mutate data reachable through the handle they
/// are given.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique name within a catalog
    fn name(&self) -> &str;

    /// Capabilities the backend must support for the scenario to be meaningful
    fn required_capabilities(&self) -> &CapabilitySet;

    /// Execute against a resolved backend
    async fn run(&self, handle: BackendHandle) -> ScenarioResult;
}

impl fmt::Debug for dyn Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name())
            .field("requires", &self.required_capabilities().to_string())
            .finish()
    }
}

/// Scenario backed by a synchronous closure
///
/// The body runs on the blocking pool so a timeout around [`Scenario::run`]
/// fires even while the body is busy.
pub struct FnScenario {
    name: String,
    required: CapabilitySet,
    body: ScenarioBody,
}

impl FnScenario {
    /// Create closure scenario
    pub fn new<F>(name: impl Into<String>, required: CapabilitySet, body: F) -> Self
    where
        F: Fn(&dyn FrontEnd) -> ScenarioResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            required,
            body: Arc::new(body),
        }
    }
}

#[async_trait]
impl Scenario for FnScenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_capabilities(&self) -> &CapabilitySet {
        &self.required
    }

    async fn run(&self, handle: BackendHandle) -> ScenarioResult {
        let body = Arc::clone(&self.body);
        match tokio::task::spawn_blocking(move || body(handle.as_ref())).await {
            Ok(result) => result,
            // Surface the panic to whoever isolates this scenario
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(ScenarioError::Backend("scenario task cancelled".to_string())),
        }
    }
}

impl fmt::Debug for FnScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnScenario")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssertionFailure;
    use tck_backend::{BackendId, FrontEndError, SourceUnit};

    #[derive(Debug)]
    struct EchoFrontEnd(BackendId);

    impl FrontEnd for EchoFrontEnd {
        fn backend_id(&self) -> &BackendId {
            &self.0
        }

        fn parse(&self, source: &str) -> Result<SourceUnit, FrontEndError> {
            Ok(SourceUnit {
                body: source.lines().map(str::to_string).collect(),
                ..SourceUnit::default()
            })
        }

        fn print(&self, unit: &SourceUnit) -> String {
            unit.body_text()
        }
    }

    fn handle() -> BackendHandle {
        Arc::new(EchoFrontEnd(BackendId::new("echo", "1")))
    }

    #[tokio::test]
    async fn fn_scenario_runs_body_against_handle() {
        let scenario = FnScenario::new("Echo", CapabilitySet::new(), |fe| {
            let unit = fe.parse("x")?;
            if fe.print(&unit) == "x" {
                Ok(())
            } else {
                Err(AssertionFailure::new("echo", "x", fe.print(&unit)).into())
            }
        });

        assert_eq!(scenario.name(), "Echo");
        assert!(scenario.run(handle()).await.is_ok());
    }

    #[tokio::test]
    async fn fn_scenario_propagates_errors() {
        let scenario = FnScenario::new("Fault", CapabilitySet::new(), |_| {
            Err(ScenarioError::Backend("down".into()))
        });
        assert_eq!(
            scenario.run(handle()).await,
            Err(ScenarioError::Backend("down".into()))
        );
    }
}
