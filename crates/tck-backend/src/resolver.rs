//! Descriptor resolution
//!
//! [`Resolver`] turns a [`BackendDescriptor`] into a handle at the moment a
//! scenario executes. [`BackendRegistry`] is the standard implementation:
//! fresh construction per resolution, except for descriptors that opt into
//! [`ReusePolicy::SharedStateless`].

use crate::backend::Backend;
use crate::descriptor::{BackendDescriptor, BackendId, ReusePolicy};
use crate::error::{RegistryError, ResolutionError};
use crate::frontend::BackendHandle;
use dashmap::DashMap;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Produces backend handles for descriptors
///
/// Resolving the same descriptor twice must give functionally equivalent
/// handles. Implementations never retry.
pub trait Resolver: Send + Sync {
    /// Resolve descriptor into a handle
    ///
    /// # Errors
    /// Returns `ResolutionError` if nothing is registered for the descriptor
    /// or construction fails.
    fn resolve(&self, descriptor: &BackendDescriptor) -> Result<BackendHandle, ResolutionError>;
}

/// Registry of backends keyed by id
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<BackendId, Arc<dyn Backend>>,
    /// Handles of `SharedStateless` backends
    shared: DashMap<BackendId, BackendHandle>,
}

impl BackendRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under the id it describes
    ///
    /// # Errors
    /// Returns `RegistryError::Duplicate` if the id is taken.
    pub fn register(&mut self, backend: impl Backend + 'static) -> Result<BackendId, RegistryError> {
        self.register_arc(Arc::new(backend))
    }

    /// Register an already shared backend
    ///
    /// # Errors
    /// Returns `RegistryError::Duplicate` if the id is taken.
    pub fn register_arc(&mut self, backend: Arc<dyn Backend>) -> Result<BackendId, RegistryError> {
        let id = backend.describe().id;
        if self.backends.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        tracing::debug!(backend = %id, "registered backend");
        self.backends.insert(id.clone(), backend);
        Ok(id)
    }

    /// Descriptor of a registered backend
    #[must_use]
    pub fn describe(&self, id: &BackendId) -> Option<BackendDescriptor> {
        self.backends.get(id).map(|b| b.describe())
    }

    /// Check if id is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &BackendId) -> bool {
        self.backends.contains_key(id)
    }

    /// Registered ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &BackendId> {
        self.backends.keys()
    }

    /// Number of registered backends
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    fn construct(backend: &dyn Backend, id: &BackendId) -> Result<BackendHandle, ResolutionError> {
        match panic::catch_unwind(AssertUnwindSafe(|| backend.construct())) {
            Ok(Ok(handle)) => Ok(handle),
            Ok(Err(source)) => Err(ResolutionError::ConstructionFailed {
                id: id.clone(),
                source,
            }),
            Err(payload) => Err(ResolutionError::ConstructionPanicked {
                id: id.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl Resolver for BackendRegistry {
    fn resolve(&self, descriptor: &BackendDescriptor) -> Result<BackendHandle, ResolutionError> {
        let id = descriptor.id();
        let backend = self
            .backends
            .get(id)
            .ok_or_else(|| ResolutionError::NotRegistered(id.clone()))?;

        if backend.describe() != *descriptor {
            return Err(ResolutionError::DescriptorMismatch(id.clone()));
        }

        match descriptor.reuse {
            ReusePolicy::FreshPerExecution => Self::construct(backend.as_ref(), id),
            ReusePolicy::SharedStateless => {
                let entry = self
                    .shared
                    .entry(id.clone())
                    .or_try_insert_with(|| Self::construct(backend.as_ref(), id))?;
                Ok(Arc::clone(entry.value()))
            }
        }
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("shared", &self.shared.len())
            .finish()
    }
}

/// Best-effort text of a panic payload
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
