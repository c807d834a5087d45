//! Harness runner
//!
//! Every enabled binding is expanded into one `ExecutionUnit` per
//! (scenario, backend) pair. Units run concurrently up to the configured
//! limit. Each unit checks capabilities, resolves its backend through the
//! `ResolutionLedger`, and runs the scenario in its own task under a
//! timeout. Whatever happens is folded into an [`Outcome`]; only setup errors
//! are returned as `Err`.

use crate::binding::HarnessPlan;
use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::observer::{NoopObserver, RunObserver};
use crate::report::{OutcomeKey, Report};
use crate::tier::{StandardTierGate, TierGate};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tck_backend::{
    panic_message, BackendDescriptor, BackendHandle, BackendId, ResolutionError, Resolver,
};
use tck_scenario::{Outcome, Scenario};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Context of one scenario execution, dropped when it completes
struct ExecutionUnit {
    binding: String,
    scenario: Arc<dyn Scenario>,
    descriptor: BackendDescriptor,
    resolver: Arc<dyn Resolver>,
    timeout: Duration,
}

impl ExecutionUnit {
    fn key(&self) -> OutcomeKey {
        OutcomeKey::new(self.scenario.name(), self.descriptor.id.clone())
    }
}

/// What a finished unit hands back to the aggregator
struct Completed {
    key: OutcomeKey,
    outcome: Outcome,
    resolution_failure: Option<String>,
    elapsed: Duration,
}

/// First resolution per backend, shared by all units of a run
///
/// The first unit to reach a backend resolves it while the others wait on
/// the cell. A failure stays in the cell and is handed to every later unit,
/// so a broken backend is attempted exactly once.
#[derive(Default)]
struct ResolutionLedger {
    first: DashMap<BackendId, Arc<OnceCell<Result<(), ResolutionError>>>>,
}

impl ResolutionLedger {
    async fn resolve(&self, unit: &ExecutionUnit) -> Result<BackendHandle, ResolutionError> {
        let cell = Arc::clone(self.first.entry(unit.descriptor.id.clone()).or_default().value());

        let mut first_handle = None;
        let slot = &mut first_handle;
        let status = cell
            .get_or_init(|| async move {
                let handle = resolve_blocking(unit).await?;
                *slot = Some(handle);
                Ok(())
            })
            .await;

        match (status, first_handle) {
            (Ok(()), Some(handle)) => Ok(handle),
            (Ok(()), None) => resolve_blocking(unit).await,
            (Err(err), _) => Err(err.clone()),
        }
    }
}

/// Construction can block, so it runs on the blocking pool under the unit's
/// timeout
///
/// A construction that overruns is abandoned, its thread is left to finish on
/// its own.
async fn resolve_blocking(unit: &ExecutionUnit) -> Result<BackendHandle, ResolutionError> {
    let resolver = Arc::clone(&unit.resolver);
    let descriptor = unit.descriptor.clone();
    let task = tokio::task::spawn_blocking(move || resolver.resolve(&descriptor));
    match tokio::time::timeout(unit.timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => Err(ResolutionError::ConstructionPanicked {
            id: unit.descriptor.id.clone(),
            message: if err.is_panic() {
                panic_message(err.into_panic().as_ref())
            } else {
                "resolution cancelled".to_string()
            },
        }),
        Err(_) => Err(ResolutionError::ConstructionTimedOut {
            id: unit.descriptor.id.clone(),
            timeout: unit.timeout,
        }),
    }
}

/// Run the scenario in its own task so panics and timeouts stay contained
async fn run_isolated(scenario: Arc<dyn Scenario>, handle: BackendHandle, timeout: Duration) -> Outcome {
    let mut task = tokio::spawn(async move { scenario.run(handle).await });
    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(result)) => Outcome::from_result(result),
        Ok(Err(err)) if err.is_panic() => Outcome::Failed(format!(
            "scenario panicked: {}",
            panic_message(err.into_panic().as_ref())
        )),
        Ok(Err(_)) => Outcome::BackendError("scenario task cancelled".to_string()),
        Err(_) => {
            task.abort();
            Outcome::Failed("timeout".to_string())
        }
    }
}

async fn execute(unit: ExecutionUnit, ledger: &ResolutionLedger) -> Completed {
    let started = Instant::now();
    let key = unit.key();
    let done = |outcome: Outcome, resolution_failure: Option<String>| Completed {
        key: key.clone(),
        outcome,
        resolution_failure,
        elapsed: started.elapsed(),
    };

    let missing = unit
        .descriptor
        .capabilities
        .missing(unit.scenario.required_capabilities());
    if !missing.is_empty() {
        return done(Outcome::missing_capabilities(&missing), None);
    }

    let handle = match ledger.resolve(&unit).await {
        Ok(handle) => handle,
        Err(err) => {
            let detail = err.to_string();
            return done(
                Outcome::BackendError(format!("backend unavailable: {detail}")),
                Some(detail),
            );
        }
    };

    if handle.backend_id() != &unit.descriptor.id {
        return done(
            Outcome::BackendError(format!(
                "resolver returned {} for {}",
                handle.backend_id(),
                unit.descriptor.id
            )),
            None,
        );
    }

    debug!(pair = %key, binding = %unit.binding, "executing scenario");
    done(
        run_isolated(Arc::clone(&unit.scenario), handle, unit.timeout).await,
        None,
    )
}

/// Executes a [`HarnessPlan`] under a [`RunConfig`]
pub struct HarnessRunner {
    plan: HarnessPlan,
    config: RunConfig,
    filter: Option<Regex>,
    gate: Arc<dyn TierGate>,
}

impl HarnessRunner {
    /// Create runner with the standard tier gate
    ///
    /// # Errors
    /// Returns the `ConfigError` from [`RunConfig::validate`].
    pub fn new(plan: HarnessPlan, config: RunConfig) -> Result<Self, ConfigError> {
        let filter = config.validate()?;
        Ok(Self {
            plan,
            config,
            filter,
            gate: Arc::new(StandardTierGate),
        })
    }

    /// Replace tier gate
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<dyn TierGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Plan being run
    #[inline]
    #[must_use]
    pub fn plan(&self) -> &HarnessPlan {
        &self.plan
    }

    /// Run configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every enabled binding
    pub async fn run(&self) -> Report {
        self.run_with(&mut NoopObserver).await
    }

    /// Run every enabled binding, streaming events to `observer`
    pub async fn run_with(&self, observer: &mut dyn RunObserver) -> Report {
        let started = Instant::now();
        let mut report = Report::new();
        let units = self.expand(&mut report, observer);

        info!(
            bindings = self.plan.len(),
            units = units.len(),
            concurrency = self.config.concurrency,
            tier = %self.config.tier,
            "starting run"
        );

        let ledger = ResolutionLedger::default();
        let mut completions = stream::iter(units)
            .map(|unit| execute(unit, &ledger))
            .buffer_unordered(self.config.concurrency);

        while let Some(done) = completions.next().await {
            if let Some(detail) = done.resolution_failure {
                if report.record_resolution_failure(done.key.backend.clone(), detail.as_str()) {
                    warn!(backend = %done.key.backend, %detail, "backend resolution failed");
                }
            }
            debug!(pair = %done.key, outcome = %done.outcome, "scenario finished");
            observer.on_outcome(&done.key, &done.outcome, done.elapsed);
            if !report.record(done.key.clone(), done.outcome) {
                error!(pair = %done.key, "outcome already recorded, keeping the first");
            }
        }

        let elapsed = started.elapsed();
        let summary = report.summary();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            backend_errors = summary.backend_errors,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "run complete"
        );
        observer.on_run_complete(&report, elapsed);
        report
    }

    /// Gate bindings and expand the enabled ones into units
    fn expand(&self, report: &mut Report, observer: &mut dyn RunObserver) -> Vec<ExecutionUnit> {
        let mut units = Vec::new();
        for binding in self.plan.iter() {
            if !self.gate.is_enabled(binding, &self.config) {
                info!(binding = binding.name(), tier = %binding.tier(), "binding not enabled");
                report.record_gated(binding.name(), binding.tier());
                observer.on_binding_gated(binding, binding.tier());
                continue;
            }
            info!(
                binding = binding.name(),
                backend = %binding.descriptor().id,
                scenarios = binding.scenarios().len(),
                "binding enabled"
            );
            if binding.is_degenerate() {
                warn!(
                    binding = binding.name(),
                    backend = %binding.descriptor().id,
                    "backend satisfies no scenario of the binding"
                );
                report.record_degenerate(binding.name());
            }

            for (scenario, descriptor) in binding.enumerate() {
                if let Some(filter) = &self.filter {
                    if !filter.is_match(scenario.name()) {
                        continue;
                    }
                }
                units.push(ExecutionUnit {
                    binding: binding.name().to_string(),
                    scenario: Arc::clone(scenario),
                    descriptor: descriptor.clone(),
                    resolver: Arc::clone(binding.resolver()),
                    timeout: self.config.scenario_timeout,
                });
            }
        }
        units
    }
}

impl fmt::Debug for HarnessRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessRunner")
            .field("plan", &self.plan)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;
    use std::sync::atomic::Ordering;
    use tck_backend::BackendRegistry;
    use tck_scenario::ScenarioSet;
    use tck_test_utils::{descriptor, ProbeScenario, StubBackend};

    fn unit(scenario: Arc<dyn Scenario>, descriptor: BackendDescriptor, resolver: Arc<dyn Resolver>) -> ExecutionUnit {
        ExecutionUnit {
            binding: "b".to_string(),
            scenario,
            descriptor,
            resolver,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn ledger_caches_failure() {
        let backend = StubBackend::failing(descriptor("lang", "1", &[]));
        let counter = backend.construction_counter();
        let mut registry = BackendRegistry::new();
        registry.register(backend.clone()).unwrap();
        let resolver: Arc<dyn Resolver> = Arc::new(registry);

        let ledger = ResolutionLedger::default();
        let a = unit(ProbeScenario::new("A", &[]).into_arc(), backend.descriptor(), Arc::clone(&resolver));
        let b = unit(ProbeScenario::new("B", &[]).into_arc(), backend.descriptor(), resolver);

        assert!(ledger.resolve(&a).await.is_err());
        assert!(ledger.resolve(&b).await.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ledger_resolves_fresh_after_first_success() {
        let backend = StubBackend::new(descriptor("lang", "1", &[]));
        let counter = backend.construction_counter();
        let mut registry = BackendRegistry::new();
        registry.register(backend.clone()).unwrap();
        let resolver: Arc<dyn Resolver> = Arc::new(registry);

        let ledger = ResolutionLedger::default();
        let a = unit(ProbeScenario::new("A", &[]).into_arc(), backend.descriptor(), Arc::clone(&resolver));
        let b = unit(ProbeScenario::new("B", &[]).into_arc(), backend.descriptor(), resolver);

        assert!(ledger.resolve(&a).await.is_ok());
        assert!(ledger.resolve(&b).await.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn panicking_resolver_is_contained() {
        let backend = StubBackend::panicking(descriptor("lang", "1", &[]));
        let mut registry = BackendRegistry::new();
        registry.register(backend.clone()).unwrap();
        let u = unit(ProbeScenario::new("A", &[]).into_arc(), backend.descriptor(), Arc::new(registry));

        let done = execute(u, &ResolutionLedger::default()).await;
        assert!(matches!(done.outcome, Outcome::BackendError(ref d) if d.starts_with("backend unavailable")));
        assert!(done.resolution_failure.is_some());
    }

    #[tokio::test]
    async fn stalled_construction_times_out() {
        let backend = StubBackend::stalling(descriptor("lang", "1", &[]), Duration::from_millis(500));
        let mut registry = BackendRegistry::new();
        registry.register(backend.clone()).unwrap();
        let mut u = unit(ProbeScenario::new("A", &[]).into_arc(), backend.descriptor(), Arc::new(registry));
        u.timeout = Duration::from_millis(50);

        let err = ResolutionLedger::default().resolve(&u).await.unwrap_err();
        assert_eq!(
            err,
            ResolutionError::ConstructionTimedOut {
                id: BackendId::new("lang", "1"),
                timeout: Duration::from_millis(50),
            }
        );
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let backend = StubBackend::new(descriptor("lang", "1", &[]));
        let mut registry = BackendRegistry::new();
        registry.register(backend.clone()).unwrap();
        let binding = Binding::builder("b")
            .scenarios(ScenarioSet::new("s", vec![ProbeScenario::new("A", &[]).into_arc()]))
            .backend(backend.descriptor(), Arc::new(registry))
            .build()
            .unwrap();
        let plan = HarnessPlan::new(vec![binding]).unwrap();
        let err = HarnessRunner::new(plan, RunConfig::default().with_concurrency(0)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConcurrency));
    }
}
