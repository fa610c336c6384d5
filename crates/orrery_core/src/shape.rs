//! Supported primitive kinds

use std::fmt;
use std::str::FromStr;

use orrery_stage::PrimType;
use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// Geometric primitive an asset is built around
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Sphere,
    Cube,
}

impl ShapeKind {
    /// Every supported kind, in asset build order
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Sphere, ShapeKind::Cube];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Cube => "Cube",
        }
    }

    /// Prim type of the asset's geometry prim
    pub fn prim_type(&self) -> PrimType {
        match self {
            ShapeKind::Sphere => PrimType::Sphere,
            ShapeKind::Cube => PrimType::Cube,
        }
    }

    /// Inverse of [`prim_type`](Self::prim_type)
    pub fn from_prim_type(prim_type: PrimType) -> Option<Self> {
        match prim_type {
            PrimType::Sphere => Some(ShapeKind::Sphere),
            PrimType::Cube => Some(ShapeKind::Cube),
            PrimType::Xform => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sphere" => Ok(ShapeKind::Sphere),
            "Cube" => Ok(ShapeKind::Cube),
            other => Err(ComposeError::UnsupportedShapeKind(other.to_string())),
        }
    }
}
