//! Reference dialects
//!
//! Each [`Dialect`] is one backend variant. Capabilities accumulate with the
//! version, so every dialect supports everything its predecessors do.

use crate::front_end::JavaFrontEnd;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tck_backend::{
    well_known, Backend, BackendDescriptor, BackendHandle, BackendId, CapabilitySet,
    ConstructKind, ConstructionError,
};

/// Language name shared by all reference dialects
pub const LANGUAGE: &str = "java";

/// Supported language levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dialect {
    /// Baseline: classes, interfaces, enums
    Java8,
    /// Adds `var` locals
    Java11,
    /// Adds text blocks and records
    Java17,
    /// Adds type patterns in `switch`
    Java21,
}

impl Dialect {
    /// Every dialect, oldest first
    pub const ALL: [Self; 4] = [Self::Java8, Self::Java11, Self::Java17, Self::Java21];

    /// Version tag, e.g. `"17"`
    #[must_use]
    pub fn version(self) -> &'static str {
        match self {
            Self::Java8 => "8",
            Self::Java11 => "11",
            Self::Java17 => "17",
            Self::Java21 => "21",
        }
    }

    /// Backend id, e.g. `java@17`
    #[must_use]
    pub fn id(self) -> BackendId {
        BackendId::new(LANGUAGE, self.version())
    }

    /// Capabilities of this language level
    #[must_use]
    pub fn capabilities(self) -> CapabilitySet {
        let mut caps = CapabilitySet::new();
        if self >= Self::Java11 {
            caps.insert(well_known::VAR_INFERENCE);
        }
        if self >= Self::Java17 {
            caps.insert(well_known::TEXT_BLOCKS);
            caps.insert(well_known::RECORDS);
        }
        if self >= Self::Java21 {
            caps.insert(well_known::PATTERN_SWITCH);
        }
        caps
    }

    /// Check if this dialect accepts a construct
    #[must_use]
    pub fn supports(self, kind: ConstructKind) -> bool {
        match required_capability(kind) {
            Some(cap) => self.capabilities().contains(cap),
            None => true,
        }
    }
}

/// Capability a construct needs, if it is not part of the baseline
#[must_use]
pub fn required_capability(kind: ConstructKind) -> Option<&'static str> {
    match kind {
        ConstructKind::Class | ConstructKind::Interface | ConstructKind::Enum => None,
        ConstructKind::LocalVar => Some(well_known::VAR_INFERENCE),
        ConstructKind::TextBlock => Some(well_known::TEXT_BLOCKS),
        ConstructKind::Record => Some(well_known::RECORDS),
        ConstructKind::TypePattern => Some(well_known::PATTERN_SWITCH),
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LANGUAGE}@{}", self.version())
    }
}

impl FromStr for Dialect {
    type Err = String;

    /// Accepts `17` or `java@17`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.strip_prefix("java@").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|d| d.version() == version)
            .ok_or_else(|| format!("unknown dialect '{s}'"))
    }
}

/// [`Backend`] for one dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JavaBackend {
    dialect: Dialect,
}

impl JavaBackend {
    /// Create backend for dialect
    #[inline]
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Dialect served
    #[inline]
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl Backend for JavaBackend {
    fn describe(&self) -> BackendDescriptor {
        BackendDescriptor::new(self.dialect.id()).with_capabilities(self.dialect.capabilities())
    }

    fn construct(&self) -> Result<BackendHandle, ConstructionError> {
        tracing::trace!(dialect = %self.dialect, "constructing front end");
        Ok(Arc::new(JavaFrontEnd::new(self.dialect)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_accumulate() {
        assert!(Dialect::Java8.capabilities().is_empty());
        assert_eq!(Dialect::Java11.capabilities().len(), 1);
        assert_eq!(Dialect::Java17.capabilities().len(), 3);
        let caps = Dialect::Java21.capabilities();
        assert_eq!(caps.len(), 4);
        assert!(caps.is_superset_of(&Dialect::Java17.capabilities()));
        assert!(caps.contains(well_known::PATTERN_SWITCH));
    }

    #[test]
    fn construct_support_follows_capabilities() {
        assert!(Dialect::Java8.supports(ConstructKind::Class));
        assert!(!Dialect::Java8.supports(ConstructKind::LocalVar));
        assert!(Dialect::Java11.supports(ConstructKind::LocalVar));
        assert!(!Dialect::Java11.supports(ConstructKind::Record));
        assert!(Dialect::Java17.supports(ConstructKind::TextBlock));
        assert!(!Dialect::Java17.supports(ConstructKind::TypePattern));
        assert!(Dialect::Java21.supports(ConstructKind::TypePattern));
    }

    #[test]
    fn ids_and_parsing() {
        assert_eq!(Dialect::Java17.id().to_string(), "java@17");
        assert_eq!(Dialect::Java21.to_string(), "java@21");
        assert_eq!("11".parse::<Dialect>().unwrap(), Dialect::Java11);
        assert_eq!("java@8".parse::<Dialect>().unwrap(), Dialect::Java8);
        assert!("9".parse::<Dialect>().is_err());
    }

    #[test]
    fn backend_describes_and_constructs() {
        let backend = JavaBackend::new(Dialect::Java17);
        let descriptor = backend.describe();
        assert_eq!(descriptor.id, Dialect::Java17.id());
        assert_eq!(descriptor.capabilities, Dialect::Java17.capabilities());

        let handle = backend.construct().unwrap();
        assert_eq!(handle.backend_id(), &descriptor.id);
    }
}
