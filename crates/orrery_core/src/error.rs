//! Composition error types

use std::fmt;

use orrery_stage::StageError;

/// Error type for asset building and scene composition
///
/// Every variant except [`ComposeError::Stage`] is a validation failure
/// detected before anything is written.
#[derive(Debug)]
pub enum ComposeError {
    /// Non-finite or structurally invalid numeric input
    InvalidParameter(String),
    /// Shape name outside the supported primitive kinds
    UnsupportedShapeKind(String),
    /// The selected color is not a variant of the referenced asset
    UnknownVariant { variant: String, asset: String },
    /// An orbit was requested on an instance without a scale
    MissingScaleForOrbit { index: usize },
    /// No asset was built for the requested shape kind
    MissingAsset(String),
    /// A persisted asset layer lacks the expected structure
    MalformedAsset(String),
    /// Error from the scene store
    Stage(StageError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ComposeError::UnsupportedShapeKind(kind) => {
                write!(f, "Unsupported shape kind: '{}'", kind)
            }
            ComposeError::UnknownVariant { variant, asset } => {
                write!(f, "Asset '{}' has no color variant '{}'", asset, variant)
            }
            ComposeError::MissingScaleForOrbit { index } => {
                write!(f, "Instance {} requests an orbit but has no scale", index)
            }
            ComposeError::MissingAsset(kind) => write!(f, "No asset built for shape '{}'", kind),
            ComposeError::MalformedAsset(msg) => write!(f, "Malformed asset: {}", msg),
            ComposeError::Stage(e) => write!(f, "Stage error: {}", e),
        }
    }
}

impl std::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComposeError::Stage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StageError> for ComposeError {
    fn from(e: StageError) -> Self {
        ComposeError::Stage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = ComposeError::UnknownVariant {
            variant: "Pink".to_string(),
            asset: "MySphere".to_string(),
        };
        assert_eq!(format!("{}", err), "Asset 'MySphere' has no color variant 'Pink'");
        assert_eq!(
            format!("{}", ComposeError::MissingScaleForOrbit { index: 3 }),
            "Instance 3 requests an orbit but has no scale"
        );
        assert_eq!(
            format!("{}", ComposeError::UnsupportedShapeKind("Cone".to_string())),
            "Unsupported shape kind: 'Cone'"
        );
    }

    #[test]
    fn test_from_stage_error() {
        let err: ComposeError = StageError::PrimNotFound("/A".to_string()).into();
        assert!(matches!(err, ComposeError::Stage(StageError::PrimNotFound(_))));
        assert!(err.source().is_some());
        assert!(ComposeError::InvalidParameter("x".to_string()).source().is_none());
    }
}
