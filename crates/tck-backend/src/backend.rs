//! Backend contract
//!
//! What an external front-end module must expose to take part in a run.

use crate::descriptor::BackendDescriptor;
use crate::error::ConstructionError;
use crate::frontend::BackendHandle;

/// One concrete front-end implementation
pub trait Backend: Send + Sync {
    /// Static description: identity, capabilities, reuse contract
    fn describe(&self) -> BackendDescriptor;

    /// Build a ready-to-use instance
    ///
    /// # Errors
    /// Returns `ConstructionError` when setup fails (missing resource etc.)
    fn construct(&self) -> Result<BackendHandle, ConstructionError>;
}
