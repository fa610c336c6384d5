//! RGB color triple

use serde::{Serialize, Deserialize};

/// Linear RGB color, each component nominally in `[0, 1]`
///
/// Serialized as a plain `(r, g, b)` tuple so palettes read naturally in
/// layer files and config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a new color
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// True when every component lies in `[0, 1]`
    pub fn in_unit_range(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    /// Components as an array
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Color3 {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Color3> for [f32; 3] {
    fn from(c: Color3) -> Self {
        c.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Color3::RED.to_array(), [1.0, 0.0, 0.0]);
        assert_eq!(Color3::BLUE.to_array(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unit_range() {
        assert!(Color3::new(0.8, 0.5, 0.25).in_unit_range());
        assert!(Color3::BLACK.in_unit_range());
        assert!(!Color3::new(1.5, 0.0, 0.0).in_unit_range());
        assert!(!Color3::new(0.0, -0.1, 0.0).in_unit_range());
    }

    #[test]
    fn test_array_conversion() {
        let c: Color3 = [0.0, 0.4, 0.0].into();
        assert_eq!(c, Color3::new(0.0, 0.4, 0.0));
    }
}
