//! Error types for backends
//!
//! Kept apart so scenario failures and backend faults never share a type:
//! - [`ConstructionError`]: a backend could not build an instance
//! - [`ResolutionError`]: a descriptor could not be turned into a handle
//! - [`FrontEndError`]: a handle faulted or rejected source
//! - [`RegistryError`]: backend registration problems

use crate::descriptor::BackendId;
use std::time::Duration;

/// Raised by [`Backend::construct`](crate::Backend::construct)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// External resource needed by the backend is unavailable
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// Any other setup failure
    #[error("setup failed: {0}")]
    Setup(String),
}

/// Descriptor could not be resolved into a ready handle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Nothing registered under this id
    #[error("no backend registered for {0}")]
    NotRegistered(BackendId),

    /// Registered backend describes itself differently
    #[error("registered backend {0} does not match the requested descriptor")]
    DescriptorMismatch(BackendId),

    /// Construction returned an error
    #[error("constructing {id} failed: {source}")]
    ConstructionFailed {
        /// Backend being constructed
        id: BackendId,
        /// Underlying failure
        #[source]
        source: ConstructionError,
    },

    /// Construction panicked
    #[error("constructing {id} panicked: {message}")]
    ConstructionPanicked {
        /// Backend being constructed
        id: BackendId,
        /// Panic payload, if printable
        message: String,
    },

    /// Construction did not finish within the allowed time
    #[error("constructing {id} timed out after {}ms", .timeout.as_millis())]
    ConstructionTimedOut {
        /// Backend being constructed
        id: BackendId,
        /// Limit that was exceeded
        timeout: Duration,
    },
}

impl ResolutionError {
    /// Backend the failure belongs to
    #[must_use]
    pub fn backend_id(&self) -> &BackendId {
        match self {
            Self::NotRegistered(id)
            | Self::DescriptorMismatch(id)
            | Self::ConstructionFailed { id, .. }
            | Self::ConstructionPanicked { id, .. }
            | Self::ConstructionTimedOut { id, .. } => id,
        }
    }
}

/// Faults reported by a front-end handle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontEndError {
    /// Source rejected with a diagnostic
    #[error("syntax error at line {line}: {message}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// Diagnostic text
        message: String,
    },

    /// Unexpected internal failure of the backend
    #[error("internal front-end error: {0}")]
    Internal(String),
}

impl FrontEndError {
    /// Create syntax diagnostic
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Backend registration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Same id registered twice
    #[error("backend already registered: {0}")]
    Duplicate(BackendId),

    /// Id string not of the form `name@version`
    #[error("invalid backend id '{0}', expected name@version")]
    InvalidId(String),
}
