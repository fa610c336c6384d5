//! Procedural layered scenes for Orrery
//!
//! This crate builds the content of an Orrery scene on top of `orrery_stage`:
//!
//! - [`AssetBuilder`] - Shape assets with a `ColorsRGB` variant set per palette
//! - [`SceneComposer`] - Scene layer instancing assets by reference
//! - [`apply_transform`] - Static transform ops and the animated orbit channel
//! - [`OrbitGenerator`] - Circular orbit trajectories
//! - [`PhaseSource`] - Per-instance orbit phase offsets
//!
//! # Example
//!
//! ```ignore
//! let builder = AssetBuilder::new(Palette::default(), TimeRange::new(0, 720));
//! let library = builder.ensure_all(dir, &ShapeKind::ALL, WritePolicy::SkipIfExists)?;
//! let scene = SceneComposer::new(&library, ComposeSettings::default())
//!     .compose(&descriptors, &mut SeededPhases::new(7))?;
//! scene.export(dir.join("MyScene.ron"), WritePolicy::Overwrite)?;
//! ```

mod error;
mod shape;
mod palette;
mod trajectory;
mod phase;
mod asset_builder;
mod descriptor;
mod transformer;
mod composer;

pub use error::ComposeError;
pub use shape::ShapeKind;
pub use palette::{NamedColor, Palette};
pub use trajectory::{generate_orbit, OrbitGenerator, Trajectory, TrajectorySample, OVERALL_SPEED};
pub use phase::{FixedPhase, PhaseSource, SeededPhases};
pub use asset_builder::{
    build_asset, AssetBuilder, AssetLibrary, ShapeAsset, COLOR_VARIANT_SET, DEFAULT_ASSET_PREFIX,
    LAYER_EXTENSION, MESH_PRIM_NAME,
};
pub use descriptor::InstanceDescriptor;
pub use transformer::{apply_transform, TransformContext, ORBIT_OP_SUFFIX};
pub use composer::{ComposeSettings, SceneComposer, DEFAULT_SCENE_NAME};
