//! Prim specs and attribute values
//!
//! A [`PrimSpec`] is the authored content of one prim in one layer: its
//! type, attributes, variant sets and selections, references, and the
//! order of its transform ops.

use std::collections::BTreeMap;
use std::path::PathBuf;

use orrery_math::{Color3, Vec3};
use serde::{Deserialize, Serialize};

use crate::path::PrimPath;

/// Well-known attribute and op names
pub mod tokens {
    /// Per-prim display color array
    pub const DISPLAY_COLOR: &str = "primvars:displayColor";
    /// Static translation op
    pub const TRANSLATE: &str = "xformOp:translate";
    /// Static XYZ Euler rotation op, in degrees
    pub const ROTATE_XYZ: &str = "xformOp:rotateXYZ";
    /// Static scale op
    pub const SCALE: &str = "xformOp:scale";
}

/// Schema type of a defined prim
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimType {
    /// Transformable grouping prim
    Xform,
    /// Sphere primitive (radius 1 in local space)
    Sphere,
    /// Cube primitive (edge length 2 in local space)
    Cube,
}

impl PrimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimType::Xform => "Xform",
            PrimType::Sphere => "Sphere",
            PrimType::Cube => "Cube",
        }
    }
}

/// A typed attribute value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Double(f64),
    Double3(Vec3),
    Color3Array(Vec<Color3>),
    Token(String),
}

impl Value {
    /// Interpolate between two samples
    ///
    /// Numeric values blend linearly; everything else holds `self`.
    pub fn lerp(&self, other: &Value, t: f64) -> Value {
        match (self, other) {
            (Value::Double(a), Value::Double(b)) => Value::Double(a + (b - a) * t),
            (Value::Double3(a), Value::Double3(b)) => Value::Double3(a.lerp(*b, t)),
            _ => self.clone(),
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Value::Double3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_colors(&self) -> Option<&[Color3]> {
        match self {
            Value::Color3Array(c) => Some(c),
            _ => None,
        }
    }
}

/// An attribute with an optional default and per-frame time samples
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub time_samples: BTreeMap<i64, Value>,
}

impl Attribute {
    /// Attribute holding only a default value
    pub fn with_default(value: Value) -> Self {
        Self { default: Some(value), time_samples: BTreeMap::new() }
    }

    pub fn is_animated(&self) -> bool {
        !self.time_samples.is_empty()
    }

    pub fn has_value(&self) -> bool {
        self.default.is_some() || self.is_animated()
    }

    /// Evaluate the attribute at `time`
    ///
    /// Time samples win over the default. Between samples numeric values
    /// are linearly interpolated; outside the sampled range the nearest
    /// sample is held.
    pub fn value_at(&self, time: f64) -> Option<Value> {
        if self.time_samples.is_empty() {
            return self.default.clone();
        }
        let before = self
            .time_samples
            .range(..=time.floor() as i64)
            .next_back();
        let after = self.time_samples.range(time.ceil() as i64..).next();
        match (before, after) {
            (Some((&t0, v0)), Some((&t1, v1))) if t1 > t0 => {
                let t = (time - t0 as f64) / (t1 - t0) as f64;
                Some(v0.lerp(v1, t))
            }
            (Some((_, v)), _) | (None, Some((_, v))) => Some(v.clone()),
            (None, None) => self.default.clone(),
        }
    }
}

/// One alternative of a variant set
///
/// `overs` holds attribute opinions keyed by the prim path relative to the
/// prim that owns the variant set (`""` is the owner itself).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overs: BTreeMap<String, BTreeMap<String, Attribute>>,
}

impl Variant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), overs: BTreeMap::new() }
    }

    /// The opinion for `attribute` on the prim at `relative`
    pub fn opinion(&self, relative: &str, attribute: &str) -> Option<&Attribute> {
        self.overs.get(relative)?.get(attribute)
    }
}

/// A named, ordered set of mutually exclusive variants
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    pub name: String,
    pub variants: Vec<Variant>,
}

impl VariantSet {
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.name.as_str())
    }
}

/// A reference to a prim in another layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Layer file, resolved relative to the referencing layer's directory
    pub asset_path: PathBuf,
    /// Target prim inside that layer
    pub prim_path: PrimPath,
}

impl Reference {
    pub fn new(asset_path: impl Into<PathBuf>, prim_path: PrimPath) -> Self {
        Self { asset_path: asset_path.into(), prim_path }
    }
}

/// The authored content of a single prim
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimSpec {
    pub path: PrimPath,
    #[serde(default)]
    pub prim_type: Option<PrimType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variant_sets: Vec<VariantSet>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variant_selections: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xform_op_order: Vec<String>,
}

impl PrimSpec {
    pub fn new(path: PrimPath, prim_type: Option<PrimType>) -> Self {
        Self {
            path,
            prim_type,
            references: Vec::new(),
            variant_sets: Vec::new(),
            variant_selections: BTreeMap::new(),
            attributes: BTreeMap::new(),
            xform_op_order: Vec::new(),
        }
    }

    pub fn variant_set(&self, name: &str) -> Option<&VariantSet> {
        self.variant_sets.iter().find(|s| s.name == name)
    }

    pub fn variant_selection(&self, set: &str) -> Option<&str> {
        self.variant_selections.get(set).map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Append `op` to the op order unless already present
    pub(crate) fn push_xform_op(&mut self, op: &str) {
        if !self.xform_op_order.iter().any(|o| o == op) {
            self.xform_op_order.push(op.to_string());
        }
    }
}

/// Name of a translate op with an optional suffix (`xformOp:translate:orbit`)
pub fn translate_op_name(suffix: Option<&str>) -> String {
    match suffix {
        Some(s) => format!("{}:{}", tokens::TRANSLATE, s),
        None => tokens::TRANSLATE.to_string(),
    }
}

/// True for any translate op name, suffixed or not
pub fn is_translate_op(name: &str) -> bool {
    name == tokens::TRANSLATE
        || name
            .strip_prefix(tokens::TRANSLATE)
            .is_some_and(|rest| rest.starts_with(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at_default_only() {
        let attr = Attribute::with_default(Value::Double(2.0));
        assert_eq!(attr.value_at(0.0), Some(Value::Double(2.0)));
        assert_eq!(attr.value_at(100.0), Some(Value::Double(2.0)));
    }

    #[test]
    fn test_value_at_samples_win_over_default() {
        let mut attr = Attribute::with_default(Value::Double(-1.0));
        attr.time_samples.insert(0, Value::Double(0.0));
        attr.time_samples.insert(10, Value::Double(10.0));

        assert_eq!(attr.value_at(0.0), Some(Value::Double(0.0)));
        assert_eq!(attr.value_at(10.0), Some(Value::Double(10.0)));
        assert_eq!(attr.value_at(2.5), Some(Value::Double(2.5)));
        // Held outside the sampled range
        assert_eq!(attr.value_at(-5.0), Some(Value::Double(0.0)));
        assert_eq!(attr.value_at(50.0), Some(Value::Double(10.0)));
    }

    #[test]
    fn test_value_at_vec3_interpolation() {
        let mut attr = Attribute::default();
        attr.time_samples.insert(0, Value::Double3(Vec3::ZERO));
        attr.time_samples.insert(2, Value::Double3(Vec3::new(2.0, 4.0, 6.0)));
        assert_eq!(attr.value_at(1.0), Some(Value::Double3(Vec3::new(1.0, 2.0, 3.0))));
    }

    #[test]
    fn test_value_at_empty() {
        assert_eq!(Attribute::default().value_at(0.0), None);
    }

    #[test]
    fn test_non_numeric_values_hold() {
        let a = Value::Token("a".to_string());
        let b = Value::Token("b".to_string());
        assert_eq!(a.lerp(&b, 0.9), a);
    }

    #[test]
    fn test_translate_op_names() {
        assert_eq!(translate_op_name(None), "xformOp:translate");
        assert_eq!(translate_op_name(Some("orbit")), "xformOp:translate:orbit");
        assert!(is_translate_op("xformOp:translate"));
        assert!(is_translate_op("xformOp:translate:orbit"));
        assert!(!is_translate_op("xformOp:translateX"));
        assert!(!is_translate_op("xformOp:scale"));
    }

    #[test]
    fn test_push_xform_op_dedups() {
        let mut spec = PrimSpec::new(PrimPath::new("/A").unwrap(), None);
        spec.push_xform_op(tokens::TRANSLATE);
        spec.push_xform_op(tokens::SCALE);
        spec.push_xform_op(tokens::TRANSLATE);
        assert_eq!(spec.xform_op_order, vec![tokens::TRANSLATE, tokens::SCALE]);
    }

    #[test]
    fn test_variant_set_lookup() {
        let set = VariantSet {
            name: "ColorsRGB".to_string(),
            variants: vec![Variant::new("Red"), Variant::new("Blue")],
        };
        assert!(set.variant("Blue").is_some());
        assert!(set.variant("Green").is_none());
        assert_eq!(set.variant_names().collect::<Vec<_>>(), vec!["Red", "Blue"]);
    }
}
