//! TCK Backend Layer
//!
//! Everything a front-end implementation needs to take part in a
//! compatibility run.
//!
//! # Core Concepts
//!
//! - [`BackendDescriptor`]: identity (`name@version`) plus [`CapabilitySet`]
//! - [`Backend`]: `describe()` + `construct()` contract for external modules
//! - [`FrontEnd`]: the abstract interface scenarios program against
//! - [`Resolver`] / [`BackendRegistry`]: descriptor to [`BackendHandle`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tck_backend::{BackendRegistry, Resolver};
//!
//! let mut registry = BackendRegistry::new();
//! let id = registry.register(my_backend)?;
//! let descriptor = registry.describe(&id).unwrap();
//! let handle = registry.resolve(&descriptor)?;
//! let unit = handle.parse("class A {}")?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod capability;
pub mod descriptor;
pub mod error;
pub mod frontend;
pub mod resolver;

// Re-exports
pub use backend::Backend;
pub use capability::{well_known, Capability, CapabilitySet};
pub use descriptor::{BackendDescriptor, BackendId, ReusePolicy};
pub use error::{ConstructionError, FrontEndError, RegistryError, ResolutionError};
pub use frontend::{BackendHandle, Construct, ConstructKind, FrontEnd, Import, SourceUnit};
pub use resolver::{panic_message, BackendRegistry, Resolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
