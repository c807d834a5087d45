//! Assertion helpers for scenario bodies
//!
//! These return [`ScenarioError`] instead of panicking, so a mismatch is
//! reported with its expected and actual sides.

use crate::error::{AssertionFailure, ScenarioError};
use std::fmt::Debug;
use tck_backend::{FrontEnd, SourceUnit};

/// Check equality
///
/// # Errors
/// Returns `ScenarioError::Assertion` when the values differ.
pub fn expect_eq<T: PartialEq + Debug>(
    description: &str,
    expected: T,
    actual: T,
) -> Result<(), ScenarioError> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionFailure::new(description, format!("{expected:?}"), format!("{actual:?}")).into())
    }
}

/// Check a condition
///
/// # Errors
/// Returns `ScenarioError::Assertion` when `condition` is false.
pub fn expect_true(description: &str, condition: bool) -> Result<(), ScenarioError> {
    if condition {
        Ok(())
    } else {
        Err(AssertionFailure::new(description, "true", "false").into())
    }
}

/// Strip the common indentation of an indented source literal
///
/// Leading and trailing blank lines are dropped; blank lines inside become
/// empty.
#[must_use]
pub fn trim_indent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    let lines = &lines[start..=end];

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    // indent counts chars, so slice at the matching char boundary
    lines
        .iter()
        .map(|l| match l.char_indices().nth(indent) {
            Some((at, _)) if !l.trim().is_empty() => &l[at..],
            _ => "",
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Source before a recipe runs and, optionally, the expected result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    before: String,
    after: Option<String>,
}

impl SourceSpec {
    /// Source that the recipe must leave unchanged
    #[must_use]
    pub fn unchanged(before: &str) -> Self {
        Self {
            before: trim_indent(before),
            after: None,
        }
    }

    /// Source that the recipe must turn into `after`
    #[must_use]
    pub fn changed(before: &str, after: &str) -> Self {
        Self {
            before: trim_indent(before),
            after: Some(trim_indent(after)),
        }
    }

    /// Input source
    #[inline]
    #[must_use]
    pub fn before(&self) -> &str {
        &self.before
    }

    /// Expected output
    #[inline]
    #[must_use]
    pub fn expected(&self) -> &str {
        self.after.as_deref().unwrap_or(&self.before)
    }
}

/// Parse, apply `recipe`, print and compare with the expected source
///
/// Returns the transformed unit for further checks.
///
/// # Errors
/// - `ScenarioError::Rejected` if the front end rejects `before`
/// - `ScenarioError::Assertion` if the printed result differs
pub fn rewrite_run<R>(
    front_end: &dyn FrontEnd,
    recipe: R,
    spec: &SourceSpec,
) -> Result<SourceUnit, ScenarioError>
where
    R: FnOnce(&mut SourceUnit),
{
    let mut unit = front_end.parse(spec.before())?;
    recipe(&mut unit);

    let printed = normalize(&front_end.print(&unit));
    let expected = normalize(spec.expected());
    if printed != expected {
        return Err(AssertionFailure::new(
            format!("recipe output on {}", front_end.backend_id()),
            expected,
            printed,
        )
        .into());
    }
    Ok(unit)
}

/// Drop trailing whitespace per line and trailing blank lines
fn normalize(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    lines.join("\n").trim_end().to_string()
}
