//! Data model for generated artifacts.
//!
//! A *key* identifies one generated artifact shared across projects. Exactly
//! one project owns the key's [`TypeDeclaration`]; any number of projects
//! contribute ordered value lists. Contributor maps are insertion-ordered
//! ([`IndexMap`]) so first-seen ordering is a structural property of the
//! model rather than an accident of iteration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Ordered mapping from contributor name to the values it submitted.
pub type Contributions = IndexMap<String, Vec<String>>;

/// The kind of generated artifact a declaration describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Enumeration,
    Array,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Enumeration => write!(f, "enum"),
            TypeKind::Array => write!(f, "array"),
        }
    }
}

/// Kind-specific shape of a declaration. Array declarations always carry an
/// element type, so the requirement is enforced by construction instead of an
/// optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Enumeration,
    Array {
        element_type: String,
        /// Include lines emitted ahead of the aggregate, in declared order.
        includes: Vec<String>,
    },
}

impl TypeShape {
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeShape::Enumeration => TypeKind::Enumeration,
            TypeShape::Array { .. } => TypeKind::Array,
        }
    }
}

/// The owning metadata for a key: what to generate, what to call it, and
/// where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub shape: TypeShape,
    /// Class name for enumerations, variable name for arrays.
    pub target_name: String,
    /// Destination path, resolved against the run's output root when
    /// relative.
    pub destination: PathBuf,
}

impl TypeDeclaration {
    pub fn enumeration(target_name: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            shape: TypeShape::Enumeration,
            target_name: target_name.into(),
            destination: destination.into(),
        }
    }

    pub fn array(
        target_name: impl Into<String>,
        element_type: impl Into<String>,
        destination: impl Into<PathBuf>,
        includes: Vec<String>,
    ) -> Self {
        Self {
            shape: TypeShape::Array {
                element_type: element_type.into(),
                includes,
            },
            target_name: target_name.into(),
            destination: destination.into(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.shape.kind()
    }
}

/// A key that has both an owning declaration and its merged contributions,
/// ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub key: String,
    pub owner: String,
    pub declaration: TypeDeclaration,
    /// Contributor order is first-submission order; each value list preserves
    /// submission order.
    pub contributions: Contributions,
}

impl GeneratedArtifact {
    /// Total number of values across all contributors.
    pub fn value_count(&self) -> usize {
        self.contributions.values().map(Vec::len).sum()
    }
}
