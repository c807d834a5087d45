//! Capability flags
//!
//! A [`Capability`] names an optional feature a front end may support.
//! Enum-valued features are spelled `key=value`, so the set stays flat.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Well-known capability names used by the reference dialects
pub mod well_known {
    /// `var` local variable type inference
    pub const VAR_INFERENCE: &str = "supports-var-inference";
    /// Multi-line `"""` text blocks
    pub const TEXT_BLOCKS: &str = "supports-text-blocks";
    /// `record` declarations
    pub const RECORDS: &str = "supports-records";
    /// Type patterns in `switch` case labels
    pub const PATTERN_SWITCH: &str = "supports-pattern-switch";
}

/// A named optional feature of a backend
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    /// Create capability from name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Capability name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Capability {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Ordered set of capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, capability: impl Into<Capability>) -> Self {
        self.0.insert(capability.into());
        self
    }

    /// Insert capability, returns false if it was already present
    pub fn insert(&mut self, capability: impl Into<Capability>) -> bool {
        self.0.insert(capability.into())
    }

    /// Check membership by name
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c.name() == name)
    }

    /// True when every capability in `required` is also in `self`
    #[must_use]
    pub fn is_superset_of(&self, required: &CapabilitySet) -> bool {
        self.0.is_superset(&required.0)
    }

    /// Capabilities of `required` that `self` lacks, in sorted order
    #[must_use]
    pub fn missing(&self, required: &CapabilitySet) -> Vec<Capability> {
        required.0.difference(&self.0).cloned().collect()
    }

    /// Number of capabilities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(none)");
        }
        let names: Vec<&str> = self.0.iter().map(Capability::name).collect();
        f.write_str(&names.join(", "))
    }
}

impl<C: Into<Capability>> FromIterator<C> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = std::collections::btree_set::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
