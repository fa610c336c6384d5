//! Ordered color palettes
//!
//! A [`Palette`] is an ordered list of named colors. Its order is the order
//! variants are added to every asset's color variant set.

use std::collections::HashSet;

use orrery_math::Color3;
use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// A named RGB color
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedColor {
    pub name: String,
    pub rgb: Color3,
}

impl NamedColor {
    pub fn new(name: impl Into<String>, rgb: Color3) -> Self {
        Self { name: name.into(), rgb }
    }
}

/// Ordered mapping from color name to RGB
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<NamedColor>);

impl Default for Palette {
    fn default() -> Self {
        Self::from_pairs([
            ("Red", Color3::new(1.0, 0.0, 0.0)),
            ("Green", Color3::new(0.0, 1.0, 0.0)),
            ("DarkGreen", Color3::new(0.0, 0.4, 0.0)),
            ("Blue", Color3::new(0.0, 0.0, 1.0)),
            ("Grey", Color3::new(0.5, 0.5, 0.5)),
            ("Black", Color3::new(0.0, 0.0, 0.0)),
            ("Cyan", Color3::new(0.0, 1.0, 1.0)),
            ("Brown", Color3::new(0.8, 0.5, 0.25)),
            ("Orange", Color3::new(1.0, 0.5, 0.0)),
            ("Yellow", Color3::new(1.0, 1.0, 0.0)),
        ])
    }
}

impl Palette {
    pub fn new(colors: Vec<NamedColor>) -> Self {
        Self(colors)
    }

    /// Build a palette from `(name, color)` pairs, keeping their order
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Color3)>) -> Self {
        Self(pairs.into_iter().map(|(n, c)| NamedColor::new(n, c)).collect())
    }

    pub fn get(&self, name: &str) -> Option<Color3> {
        self.0.iter().find(|c| c.name == name).map(|c| c.rgb)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedColor> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the palette is usable as a variant set
    ///
    /// It must be non-empty, names must be unique and non-empty, and every
    /// component must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.is_empty() {
            return Err(ComposeError::InvalidParameter("palette is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for color in &self.0 {
            if color.name.is_empty() {
                return Err(ComposeError::InvalidParameter("palette color with empty name".to_string()));
            }
            if !seen.insert(color.name.as_str()) {
                return Err(ComposeError::InvalidParameter(format!(
                    "duplicate palette color '{}'",
                    color.name
                )));
            }
            if !color.rgb.in_unit_range() {
                return Err(ComposeError::InvalidParameter(format!(
                    "palette color '{}' is outside [0, 1]",
                    color.name
                )));
            }
        }
        Ok(())
    }
}
