//! Run observers
//!
//! The runner reports progress as it happens. The [`Report`] is built either
//! way; observers only see the events.

use crate::binding::Binding;
use crate::report::{OutcomeKey, Report};
use crate::tier::Tier;
use std::io::Write;
use std::time::Duration;
use tck_scenario::Outcome;

/// Receives runner events in completion order
pub trait RunObserver: Send {
    /// A binding was held back by the tier gate
    fn on_binding_gated(&mut self, _binding: &Binding, _tier: Tier) {}

    /// A pair finished
    fn on_outcome(&mut self, _key: &OutcomeKey, _outcome: &Outcome, _elapsed: Duration) {}

    /// Every pair finished
    fn on_run_complete(&mut self, _report: &Report, _elapsed: Duration) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Prints one line per outcome to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver {
    verbose: bool,
}

impl ConsoleObserver {
    /// Create console observer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print passed pairs and gated bindings
    #[inline]
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn emit(line: &str) {
        let mut stderr = std::io::stderr().lock();
        // A closed stderr must not fail the run
        let _ = writeln!(stderr, "{line}");
    }
}

impl RunObserver for ConsoleObserver {
    fn on_binding_gated(&mut self, binding: &Binding, tier: Tier) {
        if self.verbose {
            Self::emit(&format!("binding {} not run ({tier} tier)", binding.name()));
        }
    }

    fn on_outcome(&mut self, key: &OutcomeKey, outcome: &Outcome, elapsed: Duration) {
        if matches!(outcome, Outcome::Passed) && !self.verbose {
            return;
        }
        Self::emit(&format!("{key} ... {outcome} ({:.2}s)", elapsed.as_secs_f64()));
    }

    fn on_run_complete(&mut self, report: &Report, elapsed: Duration) {
        let s = report.summary();
        Self::emit(&format!(
            "{} passed, {} failed, {} skipped, {} backend errors in {:.2}s",
            s.passed,
            s.failed,
            s.skipped,
            s.backend_errors,
            elapsed.as_secs_f64()
        ));
    }
}

/// Observer that records events, for inspection after a run
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Gated binding names
    pub gated: Vec<String>,
    /// Outcome keys in completion order
    pub completed: Vec<OutcomeKey>,
    /// Set once the run finished
    pub finished: bool,
}

impl RunObserver for RecordingObserver {
    fn on_binding_gated(&mut self, binding: &Binding, _tier: Tier) {
        self.gated.push(binding.name().to_string());
    }

    fn on_outcome(&mut self, key: &OutcomeKey, _outcome: &Outcome, _elapsed: Duration) {
        self.completed.push(key.clone());
    }

    fn on_run_complete(&mut self, _report: &Report, _elapsed: Duration) {
        self.finished = true;
    }
}
