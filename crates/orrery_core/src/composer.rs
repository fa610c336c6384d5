//! Scene composition
//!
//! Builds the scene layer: one root Xform with one child per descriptor,
//! named `shape{index}`, each referencing a shared shape asset and selecting
//! one of its color variants. Instances never modify the assets; the
//! selection and transforms live on the instance prim only.

use std::path::PathBuf;

use orrery_stage::{PrimPath, PrimType, Reference, Stage, TimeRange};

use crate::asset_builder::{AssetLibrary, COLOR_VARIANT_SET};
use crate::descriptor::InstanceDescriptor;
use crate::error::ComposeError;
use crate::phase::PhaseSource;
use crate::trajectory::OrbitGenerator;
use crate::transformer::{apply_transform, TransformContext};

/// Default name of the scene's root prim
pub const DEFAULT_SCENE_NAME: &str = "MyScene";

/// Settings shared by every instance of one composition
#[derive(Clone, Debug, PartialEq)]
pub struct ComposeSettings {
    pub scene_name: String,
    /// Inclusive frame range; orbits are sampled for `0..time_range.end`
    pub time_range: TimeRange,
    pub orbit: OrbitGenerator,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            scene_name: DEFAULT_SCENE_NAME.to_string(),
            time_range: TimeRange::new(0, 720),
            orbit: OrbitGenerator::default(),
        }
    }
}

/// Composes scenes from descriptors against a library of built assets
pub struct SceneComposer<'a> {
    library: &'a AssetLibrary,
    settings: ComposeSettings,
}

impl<'a> SceneComposer<'a> {
    pub fn new(library: &'a AssetLibrary, settings: ComposeSettings) -> Self {
        Self { library, settings }
    }

    pub fn settings(&self) -> &ComposeSettings {
        &self.settings
    }

    /// Path of the instance prim for descriptor `index`
    pub fn instance_path(&self, index: usize) -> Result<PrimPath, ComposeError> {
        Ok(PrimPath::root_child(&self.settings.scene_name)?.child(&format!("shape{}", index))?)
    }

    /// Build the scene in memory
    ///
    /// Any invalid descriptor aborts the whole composition. Asset references
    /// are relative to the directory the scene layer is exported into.
    pub fn compose(
        &self,
        descriptors: &[InstanceDescriptor],
        phases: &mut dyn PhaseSource,
    ) -> Result<Stage, ComposeError> {
        let range = self.settings.time_range;
        if range.end < range.start {
            return Err(ComposeError::InvalidParameter(format!(
                "time range [{}, {}] is inverted",
                range.start, range.end
            )));
        }

        let name = &self.settings.scene_name;
        let root = PrimPath::root_child(name)?;

        let mut stage = Stage::new(name.as_str());
        stage.set_time_range(range.start, range.end);
        stage.define_prim(&root, Some(PrimType::Xform))?;
        stage.set_default_prim(name.as_str());

        for (index, descriptor) in descriptors.iter().enumerate() {
            let kind = descriptor.shape_kind()?;
            let asset = self
                .library
                .get(kind)
                .ok_or_else(|| ComposeError::MissingAsset(kind.to_string()))?;
            if !asset.has_variant(&descriptor.color) {
                return Err(ComposeError::UnknownVariant {
                    variant: descriptor.color.clone(),
                    asset: asset.name().to_string(),
                });
            }

            let path = self.instance_path(index)?;
            stage.define_prim(&path, None)?;
            stage.add_reference(&path, Reference::new(PathBuf::from(asset.layer_file()), asset.root_path()?))?;
            stage.set_variant_selection(&path, COLOR_VARIANT_SET, &descriptor.color)?;

            let ctx = TransformContext {
                index,
                end_frame: range.end,
                orbit: &self.settings.orbit,
            };
            apply_transform(&mut stage, &path, descriptor, &ctx, phases)?;
            log::debug!("Composed {} as {} {}", path, descriptor.color, asset.name());
        }

        log::info!("Composed scene {} with {} instances", name, descriptors.len());
        Ok(stage)
    }
}
