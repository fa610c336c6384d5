//! Shape assets
//!
//! A shape asset is a standalone layer holding one geometric primitive and a
//! `ColorsRGB` variant set with one variant per palette color:
//!
//! ```text
//! /MySphere            Xform, default prim, variant set ColorsRGB
//!   /MySphere/MeshData Sphere; each variant sets primvars:displayColor here
//! ```
//!
//! Assets are written once and referenced by every scene instance of their
//! kind. [`AssetBuilder::ensure`] honours a [`WritePolicy`] so an existing
//! asset layer is left untouched and read back instead of rebuilt.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use orrery_math::Color3;
use orrery_stage::{
    layer_exists, tokens, ExportOutcome, PrimPath, PrimType, Stage, TimeRange, Value, WritePolicy,
};

use crate::error::ComposeError;
use crate::palette::{NamedColor, Palette};
use crate::shape::ShapeKind;

/// Name of the variant set holding an asset's colors
pub const COLOR_VARIANT_SET: &str = "ColorsRGB";

/// Name of the geometry prim under an asset's root
pub const MESH_PRIM_NAME: &str = "MeshData";

/// Default prefix of asset names (`MySphere`, `MyCube`)
pub const DEFAULT_ASSET_PREFIX: &str = "My";

/// Default extension of persisted layers
pub const LAYER_EXTENSION: &str = "ron";

/// A built or loaded shape asset
#[derive(Debug, Clone)]
pub struct ShapeAsset {
    name: String,
    kind: ShapeKind,
    layer_file: PathBuf,
    stage: Arc<Stage>,
}

impl ShapeAsset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// File name of the asset's layer, relative to the output directory
    pub fn layer_file(&self) -> &Path {
        &self.layer_file
    }

    /// The asset's authored content
    pub fn stage(&self) -> &Arc<Stage> {
        &self.stage
    }

    /// Path of the asset's root prim
    pub fn root_path(&self) -> Result<PrimPath, ComposeError> {
        Ok(PrimPath::root_child(&self.name)?)
    }

    /// Path of the asset's geometry prim
    pub fn mesh_path(&self) -> Result<PrimPath, ComposeError> {
        Ok(self.root_path()?.child(MESH_PRIM_NAME)?)
    }

    /// Color variant names, in authoring order
    pub fn variant_names(&self) -> Vec<&str> {
        self.root_path()
            .ok()
            .and_then(|root| self.stage.prim(&root))
            .and_then(|spec| spec.variant_set(COLOR_VARIANT_SET))
            .map(|set| set.variant_names().collect())
            .unwrap_or_default()
    }

    pub fn has_variant(&self, name: &str) -> bool {
        self.variant_names().contains(&name)
    }

    /// Display color authored by the variant `name`
    pub fn variant_color(&self, name: &str) -> Option<Color3> {
        let root = self.root_path().ok()?;
        let set = self.stage.prim(&root)?.variant_set(COLOR_VARIANT_SET)?;
        let opinion = set.variant(name)?.opinion(MESH_PRIM_NAME, tokens::DISPLAY_COLOR)?;
        opinion.default.as_ref()?.as_colors()?.first().copied()
    }

    /// The asset's colors as a palette, in variant order
    pub fn palette(&self) -> Palette {
        Palette::new(
            self.variant_names()
                .into_iter()
                .filter_map(|name| Some(NamedColor::new(name, self.variant_color(name)?)))
                .collect(),
        )
    }

    /// Wrap an opened asset layer, checking it has the expected structure
    pub fn from_stage(stage: Stage, layer_file: impl Into<PathBuf>) -> Result<Self, ComposeError> {
        let name = stage
            .default_prim()
            .ok_or_else(|| ComposeError::MalformedAsset(format!("layer '{}' has no default prim", stage.identifier())))?
            .to_string();
        let root = PrimPath::root_child(&name)?;
        let mesh = root.child(MESH_PRIM_NAME)?;

        let kind = stage
            .prim(&mesh)
            .and_then(|spec| spec.prim_type)
            .and_then(ShapeKind::from_prim_type)
            .ok_or_else(|| ComposeError::MalformedAsset(format!("{} is not a supported geometry prim", mesh)))?;

        let has_set = stage
            .prim(&root)
            .is_some_and(|spec| spec.variant_set(COLOR_VARIANT_SET).is_some());
        if !has_set {
            return Err(ComposeError::MalformedAsset(format!(
                "{} has no '{}' variant set",
                root, COLOR_VARIANT_SET
            )));
        }

        Ok(Self {
            name,
            kind,
            layer_file: layer_file.into(),
            stage: Arc::new(stage),
        })
    }
}

/// Build the asset `name` for `kind` with one color variant per palette entry
///
/// The variant set has no selection; referencing prims choose one.
pub fn build_asset(
    name: &str,
    kind: ShapeKind,
    palette: &Palette,
    time_range: TimeRange,
    layer_file: impl Into<PathBuf>,
) -> Result<ShapeAsset, ComposeError> {
    palette.validate()?;
    if time_range.end < time_range.start {
        return Err(ComposeError::InvalidParameter(format!(
            "time range [{}, {}] is inverted",
            time_range.start, time_range.end
        )));
    }

    let root = PrimPath::root_child(name)?;
    let mesh = root.child(MESH_PRIM_NAME)?;

    let mut stage = Stage::new(name);
    stage.set_time_range(time_range.start, time_range.end);
    stage.define_prim(&root, Some(PrimType::Xform))?;
    stage.set_default_prim(name);
    stage.define_prim(&mesh, Some(kind.prim_type()))?;

    stage.add_variant_set(&root, COLOR_VARIANT_SET)?;
    for color in palette.iter() {
        stage.add_variant(&root, COLOR_VARIANT_SET, &color.name)?;
        stage
            .variant_edit(&root, COLOR_VARIANT_SET, &color.name)?
            .set_attribute(&mesh, tokens::DISPLAY_COLOR, Value::Color3Array(vec![color.rgb]))?;
    }
    log::debug!("Built asset {} with {} color variants", name, palette.len());

    Ok(ShapeAsset {
        name: name.to_string(),
        kind,
        layer_file: layer_file.into(),
        stage: Arc::new(stage),
    })
}

/// Builds and persists shape assets from one palette and frame range
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    prefix: String,
    extension: String,
    palette: Palette,
    time_range: TimeRange,
}

impl AssetBuilder {
    pub fn new(palette: Palette, time_range: TimeRange) -> Self {
        Self {
            prefix: DEFAULT_ASSET_PREFIX.to_string(),
            extension: LAYER_EXTENSION.to_string(),
            palette,
            time_range,
        }
    }

    /// Use `prefix` instead of `My` in asset names
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use `extension` for layer file names
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn asset_name(&self, kind: ShapeKind) -> String {
        format!("{}{}", self.prefix, kind)
    }

    /// File name of the layer for `kind`, e.g. `MySphere.ron`
    pub fn layer_file(&self, kind: ShapeKind) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.asset_name(kind), self.extension))
    }

    /// Build the asset for `kind` in memory
    pub fn build(&self, kind: ShapeKind) -> Result<ShapeAsset, ComposeError> {
        build_asset(&self.asset_name(kind), kind, &self.palette, self.time_range, self.layer_file(kind))
    }

    /// Make sure the asset for `kind` exists in `dir`
    ///
    /// With [`WritePolicy::SkipIfExists`] an existing layer is opened and
    /// returned as-is, without rebuilding; its persisted variants win over
    /// the builder's palette. Otherwise the asset is built and written.
    pub fn ensure(
        &self,
        dir: &Path,
        kind: ShapeKind,
        policy: WritePolicy,
    ) -> Result<(ShapeAsset, ExportOutcome), ComposeError> {
        let file = self.layer_file(kind);
        let path = dir.join(&file);

        if layer_exists(&path)? && policy == WritePolicy::SkipIfExists {
            log::info!("Asset {} already exists, reusing it", path.display());
            let asset = ShapeAsset::from_stage(Stage::open(&path)?, file)?;
            if asset.kind() != kind {
                return Err(ComposeError::MalformedAsset(format!(
                    "{} holds a {} instead of a {}",
                    path.display(),
                    asset.kind(),
                    kind
                )));
            }
            return Ok((asset, ExportOutcome::Skipped));
        }

        let asset = self.build(kind)?;
        let outcome = asset.stage().export(&path, policy)?;
        Ok((asset, outcome))
    }

    /// Ensure every kind in `kinds`, collecting the results into a library
    pub fn ensure_all(
        &self,
        dir: &Path,
        kinds: &[ShapeKind],
        policy: WritePolicy,
    ) -> Result<AssetLibrary, ComposeError> {
        let mut library = AssetLibrary::new();
        for &kind in kinds {
            let (asset, outcome) = self.ensure(dir, kind, policy)?;
            log::debug!("Asset {} ready ({:?})", asset.name(), outcome);
            library.insert(asset);
        }
        Ok(library)
    }
}

/// Assets available to scene composition, one per shape kind
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    assets: BTreeMap<ShapeKind, Arc<ShapeAsset>>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset, replacing any previous asset of the same kind
    pub fn insert(&mut self, asset: ShapeAsset) -> Arc<ShapeAsset> {
        let asset = Arc::new(asset);
        self.assets.insert(asset.kind(), Arc::clone(&asset));
        asset
    }

    pub fn get(&self, kind: ShapeKind) -> Option<&Arc<ShapeAsset>> {
        self.assets.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ShapeAsset>> {
        self.assets.values()
    }
}
