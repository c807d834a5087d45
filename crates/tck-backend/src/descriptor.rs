//! Backend descriptors
//!
//! A [`BackendDescriptor`] identifies one concrete front-end implementation
//! and what it supports. Descriptors are created once per backend and live
//! for the whole process.

use crate::capability::CapabilitySet;
use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend identity: `name@version`
///
/// Parsing splits at the last `@`, so names may contain `@` but versions may
/// not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BackendId {
    /// Front-end family name
    pub name: String,
    /// Dialect or version tag
    pub version: String,
}

impl BackendId {
    /// Create new backend identifier
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl FromStr for BackendId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('@') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => {
                Ok(Self::new(name, version))
            }
            _ => Err(RegistryError::InvalidId(s.to_string())),
        }
    }
}

/// Whether one constructed handle may serve several scenario executions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReusePolicy {
    /// Construct a fresh instance for every resolution
    #[default]
    FreshPerExecution,
    /// Backend documents itself as safe for concurrent, stateless reuse
    SharedStateless,
}

/// Identity plus capabilities of one backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Backend identity
    pub id: BackendId,
    /// Supported optional features
    pub capabilities: CapabilitySet,
    /// Handle reuse contract
    #[serde(default)]
    pub reuse: ReusePolicy,
}

impl BackendDescriptor {
    /// Create descriptor with no capabilities
    #[must_use]
    pub fn new(id: BackendId) -> Self {
        Self {
            id,
            capabilities: CapabilitySet::new(),
            reuse: ReusePolicy::default(),
        }
    }

    /// With capability set
    #[inline]
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// With reuse policy
    #[inline]
    #[must_use]
    pub fn with_reuse(mut self, reuse: ReusePolicy) -> Self {
        self.reuse = reuse;
        self
    }

    /// Backend identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &BackendId {
        &self.id
    }

    /// Supported capabilities
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}
