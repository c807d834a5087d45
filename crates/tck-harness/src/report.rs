//! Run report
//!
//! Outcomes are keyed by (scenario, backend) in a `BTreeMap`, so the report
//! content does not depend on the order executions finished in.

use crate::tier::Tier;
use serde::{Serialize, Serializer};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tck_backend::BackendId;
use tck_scenario::Outcome;

/// Exit code when no scenario failed
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when any pair failed or hit a backend error
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for configuration errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Report key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OutcomeKey {
    /// Scenario name
    pub scenario: String,
    /// Backend identity
    pub backend: BackendId,
}

impl OutcomeKey {
    /// Create key
    #[must_use]
    pub fn new(scenario: impl Into<String>, backend: BackendId) -> Self {
        Self {
            scenario: scenario.into(),
            backend,
        }
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.scenario, self.backend)
    }
}

/// Outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Recorded pairs
    pub total: usize,
    /// Passed pairs
    pub passed: usize,
    /// Failed pairs
    pub failed: usize,
    /// Skipped pairs
    pub skipped: usize,
    /// Pairs with a backend error
    pub backend_errors: usize,
}

/// Aggregated result of a harness run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    outcomes: BTreeMap<OutcomeKey, Outcome>,
    resolution_failures: BTreeMap<BackendId, String>,
    gated_bindings: BTreeMap<String, Tier>,
    degenerate_bindings: BTreeSet<String>,
}

impl Report {
    /// Create empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome; an existing key is never overwritten
    ///
    /// Returns false if the key was already recorded.
    pub fn record(&mut self, key: OutcomeKey, outcome: Outcome) -> bool {
        match self.outcomes.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(outcome);
                true
            }
        }
    }

    /// Record a backend that failed resolution
    ///
    /// The first detail wins. Returns false if the backend was already
    /// recorded.
    pub fn record_resolution_failure(&mut self, backend: BackendId, detail: impl Into<String>) -> bool {
        match self.resolution_failures.entry(backend) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(detail.into());
                true
            }
        }
    }

    /// Record a binding the tier gate held back
    pub fn record_gated(&mut self, binding: impl Into<String>, tier: Tier) {
        self.gated_bindings.insert(binding.into(), tier);
    }

    /// Record a binding whose backend satisfies none of its scenarios
    pub fn record_degenerate(&mut self, binding: impl Into<String>) {
        self.degenerate_bindings.insert(binding.into());
    }

    /// Outcome for one pair
    #[must_use]
    pub fn get(&self, scenario: &str, backend: &BackendId) -> Option<&Outcome> {
        self.outcomes.get(&OutcomeKey::new(scenario, backend.clone()))
    }

    /// All outcomes, sorted by key
    pub fn outcomes(&self) -> impl Iterator<Item = (&OutcomeKey, &Outcome)> {
        self.outcomes.iter()
    }

    /// Backends whose resolution failed, with the reason
    #[must_use]
    pub fn resolution_failures(&self) -> &BTreeMap<BackendId, String> {
        &self.resolution_failures
    }

    /// Bindings the tier gate disabled
    #[must_use]
    pub fn gated_bindings(&self) -> &BTreeMap<String, Tier> {
        &self.gated_bindings
    }

    /// Bindings where every pair is skipped
    #[must_use]
    pub fn degenerate_bindings(&self) -> &BTreeSet<String> {
        &self.degenerate_bindings
    }

    /// Check if any pair against `backend` was recorded
    #[must_use]
    pub fn contains_backend(&self, backend: &BackendId) -> bool {
        self.outcomes.keys().any(|k| &k.backend == backend)
    }

    /// Number of recorded pairs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome counts
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.outcomes.len(),
            ..Summary::default()
        };
        for outcome in self.outcomes.values() {
            match outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed(_) => summary.failed += 1,
                Outcome::Skipped(_) => summary.skipped += 1,
                Outcome::BackendError(_) => summary.backend_errors += 1,
            }
        }
        summary
    }

    /// Check if any pair failed or hit a backend error
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.values().any(Outcome::is_failure)
    }

    /// Process exit code; skips alone never fail a run
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    /// Returns serialization errors from `serde_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable rendering
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Compatibility Kit Report ===\n\n");

        let mut current: Option<&BackendId> = None;
        for (key, outcome) in self.by_backend() {
            if current != Some(&key.backend) {
                report.push_str(&format!("{}\n", key.backend));
                current = Some(&key.backend);
            }
            report.push_str(&format!("  {:<32} {}\n", key.scenario, outcome));
        }

        if !self.resolution_failures.is_empty() {
            report.push_str("\nUnavailable backends:\n");
            for (backend, detail) in &self.resolution_failures {
                report.push_str(&format!("  {backend}: {detail}\n"));
            }
        }
        if !self.gated_bindings.is_empty() {
            report.push_str("\nNot run (tier):\n");
            for (binding, tier) in &self.gated_bindings {
                report.push_str(&format!("  {binding} ({tier})\n"));
            }
        }
        if !self.degenerate_bindings.is_empty() {
            report.push_str("\nBindings with no runnable scenario:\n");
            for binding in &self.degenerate_bindings {
                report.push_str(&format!("  {binding}\n"));
            }
        }

        let s = self.summary();
        report.push_str(&format!(
            "\n{} total: {} passed, {} failed, {} skipped, {} backend errors\n",
            s.total, s.passed, s.failed, s.skipped, s.backend_errors
        ));
        report
    }

    fn by_backend(&self) -> Vec<(&OutcomeKey, &Outcome)> {
        let mut entries: Vec<_> = self.outcomes.iter().collect();
        entries.sort_by(|(a, _), (b, _)| (&a.backend, &a.scenario).cmp(&(&b.backend, &b.scenario)));
        entries
    }
}

#[derive(Serialize)]
struct ReportEntry<'a> {
    scenario: &'a str,
    backend: String,
    #[serde(flatten)]
    outcome: &'a Outcome,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    summary: Summary,
    outcomes: Vec<ReportEntry<'a>>,
    resolution_failures: BTreeMap<String, &'a str>,
    gated_bindings: &'a BTreeMap<String, Tier>,
    degenerate_bindings: &'a BTreeSet<String>,
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ReportDocument {
            summary: self.summary(),
            outcomes: self
                .outcomes
                .iter()
                .map(|(key, outcome)| ReportEntry {
                    scenario: &key.scenario,
                    backend: key.backend.to_string(),
                    outcome,
                })
                .collect(),
            resolution_failures: self
                .resolution_failures
                .iter()
                .map(|(id, detail)| (id.to_string(), detail.as_str()))
                .collect(),
            gated_bindings: &self.gated_bindings,
            degenerate_bindings: &self.degenerate_bindings,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: &str) -> BackendId {
        BackendId::new("lang", v)
    }

    #[test]
    fn record_never_overwrites() {
        let mut report = Report::new();
        assert!(report.record(OutcomeKey::new("S", id("1")), Outcome::Passed));
        assert!(!report.record(OutcomeKey::new("S", id("1")), Outcome::Failed("late".into())));
        assert_eq!(report.get("S", &id("1")), Some(&Outcome::Passed));
    }

    #[test]
    fn skips_do_not_fail_the_run() {
        let mut report = Report::new();
        report.record(OutcomeKey::new("A", id("1")), Outcome::Passed);
        report.record(OutcomeKey::new("B", id("1")), Outcome::Skipped("missing capability: x".into()));
        assert_eq!(report.exit_code(), EXIT_SUCCESS);

        report.record(OutcomeKey::new("C", id("1")), Outcome::BackendError("down".into()));
        assert_eq!(report.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn summary_counts() {
        let mut report = Report::new();
        report.record(OutcomeKey::new("A", id("1")), Outcome::Passed);
        report.record(OutcomeKey::new("A", id("2")), Outcome::Failed("x".into()));
        report.record(OutcomeKey::new("B", id("1")), Outcome::Skipped("y".into()));
        report.record(OutcomeKey::new("B", id("2")), Outcome::BackendError("z".into()));
        assert_eq!(
            report.summary(),
            Summary { total: 4, passed: 1, failed: 1, skipped: 1, backend_errors: 1 }
        );
    }

    #[test]
    fn json_shape() {
        let mut report = Report::new();
        report.record(OutcomeKey::new("A", id("1")), Outcome::Failed("timeout".into()));
        assert!(report.record_resolution_failure(id("2"), "missing resource: jdk"));
        assert!(!report.record_resolution_failure(id("2"), "again"));
        report.record_gated("v3", Tier::Extended);

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["outcomes"][0]["scenario"], "A");
        assert_eq!(value["outcomes"][0]["backend"], "lang@1");
        assert_eq!(value["outcomes"][0]["status"], "failed");
        assert_eq!(value["outcomes"][0]["detail"], "timeout");
        assert_eq!(value["resolution_failures"]["lang@2"], "missing resource: jdk");
        assert_eq!(value["gated_bindings"]["v3"], "extended");
        assert_eq!(value["summary"]["failed"], 1);
    }

    #[test]
    fn text_groups_by_backend() {
        let mut report = Report::new();
        report.record(OutcomeKey::new("B", id("1")), Outcome::Passed);
        report.record(OutcomeKey::new("A", id("2")), Outcome::Passed);
        report.record(OutcomeKey::new("A", id("1")), Outcome::Passed);
        let text = report.generate_text();
        let first = text.find("lang@1").unwrap();
        let second = text.find("lang@2").unwrap();
        assert!(first < second);
        assert!(text.contains("3 total: 3 passed"));
    }
}
