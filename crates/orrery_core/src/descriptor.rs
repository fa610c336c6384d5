//! Instance descriptors
//!
//! One descriptor per scene object, usually read from a JSON array:
//!
//! ```json
//! [
//!   { "shape": "Sphere", "color": "Yellow", "scale": [2, 2, 2] },
//!   { "shape": "Cube", "color": "Red", "scale": [1, 1, 1], "orbit": [7] }
//! ]
//! ```

use orrery_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ComposeError;
use crate::shape::ShapeKind;

/// Input record for one scene instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    /// Shape kind name (`Sphere` or `Cube`)
    pub shape: String,
    /// Color variant to select on the referenced asset
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<[f64; 3]>,
    /// Euler angles in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 3]>,
    /// Orbit parameters; only the first element (radius) is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<Vec<f64>>,
}

impl InstanceDescriptor {
    pub fn new(shape: ShapeKind, color: impl Into<String>) -> Self {
        Self {
            shape: shape.as_str().to_string(),
            color: color.into(),
            translate: None,
            rotate: None,
            scale: None,
            orbit: None,
        }
    }

    pub fn with_translate(mut self, translate: Vec3) -> Self {
        self.translate = Some(translate.to_array());
        self
    }

    pub fn with_rotate(mut self, rotate: Vec3) -> Self {
        self.rotate = Some(rotate.to_array());
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale.to_array());
        self
    }

    pub fn with_orbit(mut self, radius: f64) -> Self {
        self.orbit = Some(vec![radius]);
        self
    }

    /// Parse the shape name
    pub fn shape_kind(&self) -> Result<ShapeKind, ComposeError> {
        self.shape.parse()
    }

    pub fn translate(&self) -> Option<Vec3> {
        self.translate.map(Vec3::from)
    }

    pub fn rotate(&self) -> Option<Vec3> {
        self.rotate.map(Vec3::from)
    }

    pub fn scale(&self) -> Option<Vec3> {
        self.scale.map(Vec3::from)
    }

    /// Orbit radius, if an orbit was requested
    ///
    /// An empty orbit array counts as no orbit.
    pub fn orbit_radius(&self) -> Result<Option<f64>, ComposeError> {
        Ok(self.orbit.as_ref().and_then(|values| values.first().copied()))
    }

    /// Reject non-finite vector components
    pub fn validate_finite(&self) -> Result<(), ComposeError> {
        let vectors = [("translate", self.translate()), ("rotate", self.rotate()), ("scale", self.scale())];
        for (name, value) in vectors {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ComposeError::InvalidParameter(format!("{} {:?} is not finite", name, v.to_array())));
                }
            }
        }
        Ok(())
    }
}
