//! Composed value resolution
//!
//! The [`Resolver`] reads a stage the way a consumer would: through its
//! references and variant selections. Opinion strength, strongest first:
//!
//! 1. values authored directly on the prim,
//! 2. opinions inside the selected variant of a variant set owned by the
//!    prim or one of its ancestors,
//! 3. the referenced layer, resolved recursively, with the referencing
//!    prims' variant selections overriding the target layer's own.
//!
//! Only the nearest ancestor carrying references is followed. Reference
//! asset paths are resolved relative to the directory of the referencing
//! layer.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::StageError;
use crate::layer_cache::LayerCache;
use crate::path::PrimPath;
use crate::prim::Value;
use crate::stage::Stage;

/// Deepest chain of references followed before giving up
pub const MAX_REFERENCE_DEPTH: usize = 32;

/// Variant selections imposed by stronger layers, keyed by target prim path
type Selections = HashMap<PrimPath, BTreeMap<String, String>>;

/// Resolves attribute values and variant selections across layers
#[derive(Default)]
pub struct Resolver {
    cache: LayerCache,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_mut(&mut self) -> &mut LayerCache {
        &mut self.cache
    }

    /// Resolve the value of `name` on the prim at `path` at `time`
    ///
    /// `base_dir` is the directory the stage is (or will be) saved in.
    /// Returns `Ok(None)` when no layer has an opinion.
    pub fn resolve_attribute(
        &mut self,
        stage: &Stage,
        base_dir: &Path,
        path: &PrimPath,
        name: &str,
        time: f64,
    ) -> Result<Option<Value>, StageError> {
        self.resolve_in(stage, base_dir, path, name, time, &Selections::new(), 0)
    }

    /// The variant selected for `set` on the prim at `path`
    ///
    /// A selection authored on the prim wins; otherwise the referenced
    /// prim's selection is used.
    pub fn resolve_variant_selection(
        &mut self,
        stage: &Stage,
        base_dir: &Path,
        path: &PrimPath,
        set: &str,
    ) -> Result<Option<String>, StageError> {
        self.selection_in(stage, base_dir, path, set, 0)
    }

    fn selection_in(
        &mut self,
        stage: &Stage,
        base_dir: &Path,
        path: &PrimPath,
        set: &str,
        depth: usize,
    ) -> Result<Option<String>, StageError> {
        if depth > MAX_REFERENCE_DEPTH {
            return Err(StageError::ReferenceCycle(path.to_string()));
        }
        let Some(spec) = stage.prim(path) else {
            return Ok(None);
        };
        if let Some(selected) = spec.variant_selection(set) {
            return Ok(Some(selected.to_string()));
        }
        for reference in &spec.references {
            let layer_path = base_dir.join(&reference.asset_path);
            let target = self.open(&layer_path)?;
            let target_dir = parent_dir(&layer_path, base_dir);
            if let Some(selected) =
                self.selection_in(&target, &target_dir, &reference.prim_path, set, depth + 1)?
            {
                return Ok(Some(selected));
            }
        }
        Ok(None)
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_in(
        &mut self,
        stage: &Stage,
        base_dir: &Path,
        path: &PrimPath,
        name: &str,
        time: f64,
        overrides: &Selections,
        depth: usize,
    ) -> Result<Option<Value>, StageError> {
        if depth > MAX_REFERENCE_DEPTH {
            return Err(StageError::ReferenceCycle(path.to_string()));
        }

        if let Some(value) = stage.attribute(path, name).and_then(|a| a.value_at(time)) {
            return Ok(Some(value));
        }

        let chain = path.ancestors_inclusive();

        for ancestor in &chain {
            let Some(spec) = stage.prim(ancestor) else { continue };
            let relative = path.relative_to(ancestor).unwrap_or_default();
            for set in &spec.variant_sets {
                let selected = overrides
                    .get(ancestor)
                    .and_then(|s| s.get(&set.name))
                    .map(String::as_str)
                    .or_else(|| spec.variant_selection(&set.name));
                let Some(variant) = selected.and_then(|v| set.variant(v)) else { continue };
                if let Some(value) = variant.opinion(relative, name).and_then(|a| a.value_at(time)) {
                    return Ok(Some(value));
                }
            }
        }

        let Some(anchor) = chain
            .iter()
            .find(|p| stage.prim(p).is_some_and(|s| !s.references.is_empty()))
        else {
            return Ok(None);
        };
        let Some(anchor_spec) = stage.prim(anchor) else {
            return Ok(None);
        };
        let relative = path.relative_to(anchor).unwrap_or_default();

        for reference in &anchor_spec.references {
            let target_path = reference.prim_path.join(relative)?;

            // Selections on the anchor and below travel into the target layer
            let mut carried = Selections::new();
            for prim in chain.iter().filter(|p| p.has_prefix(anchor)) {
                let mut selections = stage
                    .prim(prim)
                    .map(|s| s.variant_selections.clone())
                    .unwrap_or_default();
                if let Some(stronger) = overrides.get(prim) {
                    selections.extend(stronger.clone());
                }
                if !selections.is_empty() {
                    let mapped = reference
                        .prim_path
                        .join(prim.relative_to(anchor).unwrap_or_default())?;
                    carried.insert(mapped, selections);
                }
            }

            let layer_path = base_dir.join(&reference.asset_path);
            let target = self.open(&layer_path)?;
            let target_dir = parent_dir(&layer_path, base_dir);
            if let Some(value) =
                self.resolve_in(&target, &target_dir, &target_path, name, time, &carried, depth + 1)?
            {
                return Ok(Some(value));
            }
        }

        Ok(None)
    }

    fn open(&mut self, layer_path: &Path) -> Result<std::sync::Arc<Stage>, StageError> {
        let handle = self.cache.load(layer_path)?;
        self.cache
            .get(&handle)
            .ok_or_else(|| StageError::PrimNotFound(layer_path.display().to_string()))
    }
}

fn parent_dir(layer_path: &Path, fallback: &Path) -> std::path::PathBuf {
    layer_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf())
}
