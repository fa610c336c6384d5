//! Stage error types
//!
//! Provides error handling for authoring, opening and exporting layers.

use std::fmt;
use std::io;

/// Error type for stage operations
#[derive(Debug)]
pub enum StageError {
    /// IO error (file not found, permission denied, failed replace, etc.)
    Io(io::Error),
    /// Parse error (invalid RON layer text)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
    /// Malformed prim path
    InvalidPath(String),
    /// No prim is defined at the given path
    PrimNotFound(String),
    /// The prim has no variant set with this name
    VariantSetNotFound { prim: String, set: String },
    /// The variant set has no variant with this name
    VariantNotFound { prim: String, set: String, variant: String },
    /// Reference chain deeper than the resolver allows (usually a cycle)
    ReferenceCycle(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Io(e) => write!(f, "IO error: {}", e),
            StageError::Parse(e) => write!(f, "Parse error: {}", e),
            StageError::Serialize(e) => write!(f, "Serialize error: {}", e),
            StageError::InvalidPath(p) => write!(f, "Invalid prim path: '{}'", p),
            StageError::PrimNotFound(p) => write!(f, "No prim at path: {}", p),
            StageError::VariantSetNotFound { prim, set } => {
                write!(f, "Prim {} has no variant set '{}'", prim, set)
            }
            StageError::VariantNotFound { prim, set, variant } => {
                write!(f, "Variant set '{}' on {} has no variant '{}'", set, prim, variant)
            }
            StageError::ReferenceCycle(p) => write!(f, "Reference cycle while resolving {}", p),
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StageError::Io(e) => Some(e),
            StageError::Parse(e) => Some(e),
            StageError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StageError {
    fn from(e: io::Error) -> Self {
        StageError::Io(e)
    }
}

impl From<ron::error::SpannedError> for StageError {
    fn from(e: ron::error::SpannedError) -> Self {
        StageError::Parse(e)
    }
}

impl From<ron::Error> for StageError {
    fn from(e: ron::Error) -> Self {
        StageError::Serialize(e)
    }
}

impl From<tempfile::PersistError> for StageError {
    fn from(e: tempfile::PersistError) -> Self {
        StageError::Io(e.error)
    }
}
