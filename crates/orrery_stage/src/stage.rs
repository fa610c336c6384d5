//! In-memory stage
//!
//! A [`Stage`] is an editable scene graph backed by a single layer. Prims are
//! stored in a slot map and addressed by [`PrimPath`]; sibling order is the
//! order in which prims were defined, and that order is preserved through
//! export and open.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use orrery_math::Vec3;
use slotmap::{new_key_type, SlotMap};

use crate::error::StageError;
use crate::layer::{layer_exists, write_atomic, ExportOutcome, Layer, TimeRange, WritePolicy};
use crate::path::PrimPath;
use crate::prim::{
    is_translate_op, tokens, translate_op_name, Attribute, PrimSpec, PrimType, Reference, Value,
    Variant, VariantSet,
};

new_key_type! {
    /// Key to a prim in a stage
    pub struct PrimKey;
}

#[derive(Clone, Debug)]
struct PrimNode {
    spec: PrimSpec,
    children: Vec<PrimKey>,
}

/// An editable scene graph
#[derive(Clone, Debug)]
pub struct Stage {
    identifier: String,
    default_prim: Option<String>,
    time_range: Option<TimeRange>,
    prims: SlotMap<PrimKey, PrimNode>,
    /// Reverse index from path to key
    path_index: HashMap<PrimPath, PrimKey>,
    /// Root-level prims in definition order
    roots: Vec<PrimKey>,
}

impl Stage {
    /// Create a new empty stage
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            default_prim: None,
            time_range: None,
            prims: SlotMap::with_key(),
            path_index: HashMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Set the stage's animation frame range
    pub fn set_time_range(&mut self, start: i64, end: i64) {
        self.time_range = Some(TimeRange::new(start, end));
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    /// Set the root prim used when a reference names no target prim
    pub fn set_default_prim(&mut self, name: impl Into<String>) {
        self.default_prim = Some(name.into());
    }

    pub fn default_prim(&self) -> Option<&str> {
        self.default_prim.as_deref()
    }

    // --- Prim definition and lookup ---

    /// Define a prim at `path`, defining any missing ancestors as untyped prims
    ///
    /// Defining an existing prim keeps its content; a `Some` type replaces the
    /// current type.
    pub fn define_prim(&mut self, path: &PrimPath, prim_type: Option<PrimType>) -> Result<(), StageError> {
        if let Some(&key) = self.path_index.get(path) {
            if prim_type.is_some() {
                self.prims[key].spec.prim_type = prim_type;
            }
            return Ok(());
        }

        let parent_key = match path.parent() {
            Some(parent) => {
                self.define_prim(&parent, None)?;
                Some(self.path_index[&parent])
            }
            None => None,
        };

        let key = self.prims.insert(PrimNode {
            spec: PrimSpec::new(path.clone(), prim_type),
            children: Vec::new(),
        });
        self.path_index.insert(path.clone(), key);
        match parent_key {
            Some(parent) => self.prims[parent].children.push(key),
            None => self.roots.push(key),
        }
        Ok(())
    }

    pub fn has_prim(&self, path: &PrimPath) -> bool {
        self.path_index.contains_key(path)
    }

    /// Get the spec of the prim at `path`
    pub fn prim(&self, path: &PrimPath) -> Option<&PrimSpec> {
        self.path_index.get(path).map(|&key| &self.prims[key].spec)
    }

    fn prim_mut(&mut self, path: &PrimPath) -> Result<&mut PrimSpec, StageError> {
        let key = *self
            .path_index
            .get(path)
            .ok_or_else(|| StageError::PrimNotFound(path.to_string()))?;
        Ok(&mut self.prims[key].spec)
    }

    /// Paths of the children of `path`, in definition order
    pub fn children(&self, path: &PrimPath) -> Vec<&PrimPath> {
        match self.path_index.get(path) {
            Some(&key) => self.prims[key]
                .children
                .iter()
                .map(|&c| &self.prims[c].spec.path)
                .collect(),
            None => Vec::new(),
        }
    }

    /// All prims depth-first, parents before children
    pub fn traverse(&self) -> Vec<&PrimSpec> {
        let mut out = Vec::with_capacity(self.prims.len());
        let mut stack: Vec<PrimKey> = self.roots.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            let node = &self.prims[key];
            out.push(&node.spec);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    #[inline]
    pub fn prim_count(&self) -> usize {
        self.prims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    // --- Attributes ---

    /// Set the default value of an attribute
    pub fn set_attribute(&mut self, path: &PrimPath, name: &str, value: Value) -> Result<(), StageError> {
        let spec = self.prim_mut(path)?;
        spec.attributes.entry(name.to_string()).or_default().default = Some(value);
        Ok(())
    }

    /// Set the value of an attribute at an integer frame
    pub fn set_time_sample(&mut self, path: &PrimPath, name: &str, frame: i64, value: Value) -> Result<(), StageError> {
        let spec = self.prim_mut(path)?;
        spec.attributes
            .entry(name.to_string())
            .or_default()
            .time_samples
            .insert(frame, value);
        Ok(())
    }

    /// Get an attribute authored directly on the prim at `path`
    pub fn attribute(&self, path: &PrimPath, name: &str) -> Option<&Attribute> {
        self.prim(path)?.attribute(name)
    }

    // --- Variants ---

    /// Add a variant set to a prim (no-op if it already exists)
    pub fn add_variant_set(&mut self, path: &PrimPath, set: &str) -> Result<(), StageError> {
        let spec = self.prim_mut(path)?;
        if spec.variant_set(set).is_none() {
            spec.variant_sets.push(VariantSet { name: set.to_string(), variants: Vec::new() });
        }
        Ok(())
    }

    /// Add a variant to an existing variant set (no-op if it already exists)
    pub fn add_variant(&mut self, path: &PrimPath, set: &str, variant: &str) -> Result<(), StageError> {
        let variant_set = self.variant_set_mut(path, set)?;
        if variant_set.variant(variant).is_none() {
            variant_set.variants.push(Variant::new(variant));
        }
        Ok(())
    }

    /// Record a variant selection on a prim
    ///
    /// The set may live on this prim or come through a reference, so the
    /// selection is not checked here.
    pub fn set_variant_selection(&mut self, path: &PrimPath, set: &str, variant: &str) -> Result<(), StageError> {
        let spec = self.prim_mut(path)?;
        spec.variant_selections.insert(set.to_string(), variant.to_string());
        Ok(())
    }

    /// Open an edit scope whose opinions apply only while `variant` is selected
    pub fn variant_edit(&mut self, path: &PrimPath, set: &str, variant: &str) -> Result<VariantEditContext<'_>, StageError> {
        if self.variant_set_mut(path, set)?.variant(variant).is_none() {
            return Err(StageError::VariantNotFound {
                prim: path.to_string(),
                set: set.to_string(),
                variant: variant.to_string(),
            });
        }
        Ok(VariantEditContext {
            stage: self,
            owner: path.clone(),
            set: set.to_string(),
            variant: variant.to_string(),
        })
    }

    fn variant_set_mut(&mut self, path: &PrimPath, set: &str) -> Result<&mut VariantSet, StageError> {
        let spec = self.prim_mut(path)?;
        spec.variant_sets
            .iter_mut()
            .find(|s| s.name == set)
            .ok_or_else(|| StageError::VariantSetNotFound {
                prim: path.to_string(),
                set: set.to_string(),
            })
    }

    // --- References ---

    /// Reference `target` in another layer from the prim at `path`
    pub fn add_reference(&mut self, path: &PrimPath, reference: Reference) -> Result<(), StageError> {
        let spec = self.prim_mut(path)?;
        if !spec.references.contains(&reference) {
            spec.references.push(reference);
        }
        Ok(())
    }

    // --- Transform ops ---

    /// Set the static translation
    pub fn set_translate(&mut self, path: &PrimPath, translate: Vec3) -> Result<(), StageError> {
        self.set_xform_op(path, tokens::TRANSLATE, translate)
    }

    /// Set the static XYZ Euler rotation, in degrees
    pub fn set_rotate(&mut self, path: &PrimPath, rotate: Vec3) -> Result<(), StageError> {
        self.set_xform_op(path, tokens::ROTATE_XYZ, rotate)
    }

    /// Set the static scale
    pub fn set_scale(&mut self, path: &PrimPath, scale: Vec3) -> Result<(), StageError> {
        self.set_xform_op(path, tokens::SCALE, scale)
    }

    /// Append an extra translate op named `xformOp:translate:<suffix>`
    ///
    /// Returns the op's attribute name, to be filled with values or samples.
    pub fn add_translate_op(&mut self, path: &PrimPath, suffix: &str) -> Result<String, StageError> {
        let name = translate_op_name(Some(suffix));
        let spec = self.prim_mut(path)?;
        spec.attributes.entry(name.clone()).or_default();
        spec.push_xform_op(&name);
        Ok(name)
    }

    fn set_xform_op(&mut self, path: &PrimPath, op: &str, value: Vec3) -> Result<(), StageError> {
        let spec = self.prim_mut(path)?;
        spec.attributes.entry(op.to_string()).or_default().default = Some(Value::Double3(value));
        spec.push_xform_op(op);
        Ok(())
    }

    /// Local translation of a prim at `time`
    ///
    /// All translate ops in the op order are independent channels and are
    /// summed; ops without a value contribute nothing. Returns `None` if
    /// the prim does not exist.
    pub fn translation_at(&self, path: &PrimPath, time: f64) -> Option<Vec3> {
        let spec = self.prim(path)?;
        let total = spec
            .xform_op_order
            .iter()
            .filter(|op| is_translate_op(op))
            .filter_map(|op| spec.attribute(op)?.value_at(time)?.as_vec3())
            .fold(Vec3::ZERO, |acc, v| acc + v);
        Some(total)
    }

    // --- Serialization ---

    /// Snapshot this stage as a serializable layer
    pub fn to_layer(&self) -> Layer {
        Layer {
            identifier: self.identifier.clone(),
            default_prim: self.default_prim.clone(),
            time_range: self.time_range,
            prims: self.traverse().into_iter().cloned().collect(),
        }
    }

    /// Rebuild a stage from a layer
    pub fn from_layer(layer: Layer) -> Result<Self, StageError> {
        let mut stage = Stage::new(layer.identifier);
        stage.default_prim = layer.default_prim;
        stage.time_range = layer.time_range;
        for spec in layer.prims {
            stage.define_prim(&spec.path, spec.prim_type)?;
            let key = stage.path_index[&spec.path];
            stage.prims[key].spec = spec;
        }
        Ok(stage)
    }

    /// Render the stage's layer as text
    pub fn export_to_string(&self) -> Result<String, StageError> {
        self.to_layer().to_ron_string()
    }

    /// Open a persisted layer
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StageError> {
        let contents = fs::read_to_string(path)?;
        Self::from_layer(Layer::from_ron_str(&contents)?)
    }

    /// Persist the stage to `path` according to `policy`
    pub fn export<P: AsRef<Path>>(&self, path: P, policy: WritePolicy) -> Result<ExportOutcome, StageError> {
        let path = path.as_ref();
        if layer_exists(path)? && policy == WritePolicy::SkipIfExists {
            log::info!("Layer {} already exists, skipping export", path.display());
            return Ok(ExportOutcome::Skipped);
        }

        let contents = self.export_to_string()?;
        log::debug!("Exporting layer '{}':\n{}", self.identifier, contents);
        write_atomic(path, &contents)?;
        log::info!("Exported {} prims to {}", self.prim_count(), path.display());
        Ok(ExportOutcome::Written)
    }
}

/// Edit scope for authoring opinions inside one variant
///
/// Returned by [`Stage::variant_edit`]. Opinions may target the prim that
/// owns the variant set or any of its descendants.
pub struct VariantEditContext<'a> {
    stage: &'a mut Stage,
    owner: PrimPath,
    set: String,
    variant: String,
}

impl VariantEditContext<'_> {
    /// Author a default value visible only while this variant is selected
    pub fn set_attribute(&mut self, path: &PrimPath, name: &str, value: Value) -> Result<(), StageError> {
        let relative = path
            .relative_to(&self.owner)
            .ok_or_else(|| StageError::InvalidPath(path.to_string()))?
            .to_string();
        let owner = self.owner.clone();
        let variant_name = self.variant.clone();
        let variant = self
            .stage
            .variant_set_mut(&owner, &self.set)?
            .variants
            .iter_mut()
            .find(|v| v.name == variant_name)
            .ok_or_else(|| StageError::VariantNotFound {
                prim: owner.to_string(),
                set: self.set.clone(),
                variant: variant_name.clone(),
            })?;
        variant
            .overs
            .entry(relative)
            .or_default()
            .insert(name.to_string(), Attribute::with_default(value));
        Ok(())
    }
}
