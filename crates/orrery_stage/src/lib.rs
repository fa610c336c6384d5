//! Scene store for the Orrery composer
//!
//! This crate provides a small layered scene graph:
//!
//! - [`PrimPath`] - Absolute, validated prim address
//! - [`Stage`] - Editable scene graph backed by one layer
//! - [`PrimSpec`] - Authored content of one prim (type, attributes, variants, references)
//! - [`VariantEditContext`] - Edit scope for opinions inside one variant
//! - [`Layer`] - Serialized (RON) form of a stage
//! - [`WritePolicy`] - Skip-if-exists or overwrite on export
//! - [`LayerCache`] - Shared, deduplicated opened layers
//! - [`Resolver`] - Composed attribute values through references and variant selections
//! - [`StageValidator`] - Structural checks before export

mod error;
mod path;
mod prim;
mod layer;
mod stage;
mod layer_cache;
mod resolve;
mod validator;

pub use error::StageError;
pub use path::PrimPath;
pub use prim::{
    is_translate_op, tokens, translate_op_name, Attribute, PrimSpec, PrimType, Reference, Value,
    Variant, VariantSet,
};
pub use layer::{layer_exists, ExportOutcome, Layer, TimeRange, WritePolicy};
pub use stage::{PrimKey, Stage, VariantEditContext};
pub use layer_cache::{LayerCache, LayerHandle, LayerId};
pub use resolve::{Resolver, MAX_REFERENCE_DEPTH};
pub use validator::{StageValidator, ValidationError};

// Re-export math types used throughout the stage API
pub use orrery_math::{Color3, Vec3};
