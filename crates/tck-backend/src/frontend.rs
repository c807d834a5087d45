//! Abstract front-end interface
//!
//! Scenarios only ever see a [`BackendHandle`]: parse source into a
//! [`SourceUnit`], inspect or edit it, print it back.

use crate::descriptor::BackendId;
use crate::error::FrontEndError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared, ready-to-use front-end instance
pub type BackendHandle = Arc<dyn FrontEnd>;

/// Capability interface every dialect implementation exposes
pub trait FrontEnd: Send + Sync + fmt::Debug {
    /// Identity of the backend that built this instance
    fn backend_id(&self) -> &BackendId;

    /// Parse one compilation unit
    ///
    /// # Errors
    /// - `FrontEndError::Syntax` when the dialect rejects the source
    /// - `FrontEndError::Internal` on unexpected faults
    fn parse(&self, source: &str) -> Result<SourceUnit, FrontEndError>;

    /// Print a unit in the backend's canonical layout
    fn print(&self, unit: &SourceUnit) -> String;
}

/// One import declaration
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Import {
    /// `import static`
    pub is_static: bool,
    /// Fully qualified path, e.g. `java.util.List`
    pub path: String,
}

impl Import {
    /// Regular type import
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            is_static: false,
            path: path.into(),
        }
    }

    /// Static member import
    #[must_use]
    pub fn new_static(path: impl Into<String>) -> Self {
        Self {
            is_static: true,
            path: path.into(),
        }
    }

    /// Last path segment (`List` for `java.util.List`)
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            write!(f, "import static {};", self.path)
        } else {
            write!(f, "import {};", self.path)
        }
    }
}

/// Language constructs a front end recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructKind {
    /// `class` declaration
    Class,
    /// `interface` declaration
    Interface,
    /// `enum` declaration
    Enum,
    /// `record` declaration
    Record,
    /// `var` local declaration
    LocalVar,
    /// `"""` text block
    TextBlock,
    /// `case Type name ->` label
    TypePattern,
}

/// A recognised construct and where it starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Construct {
    /// What was recognised
    pub kind: ConstructKind,
    /// Declared name, if the construct has one
    pub name: Option<String>,
    /// 1-based line in the parsed source
    pub line: usize,
}

/// Parsed compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// `package` name
    pub package: Option<String>,
    /// Imports in source order
    pub imports: Vec<Import>,
    /// Recognised constructs in source order
    pub constructs: Vec<Construct>,
    /// Everything after the header, verbatim
    pub body: Vec<String>,
}

impl SourceUnit {
    /// Check for an import by path
    #[must_use]
    pub fn has_import(&self, path: &str) -> bool {
        self.imports.iter().any(|i| i.path == path)
    }

    /// Constructs of one kind
    pub fn constructs_of(&self, kind: ConstructKind) -> impl Iterator<Item = &Construct> {
        self.constructs.iter().filter(move |c| c.kind == kind)
    }

    /// Body joined with newlines
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }
}
