//! Orrery: procedural layered scene generation
//!
//! Builds reusable shape assets with color variants, composes a scene that
//! instances them by reference, and animates instances along circular
//! orbits. See `orrery_core` and `orrery_stage` for the building blocks.

pub mod config;
pub mod pipeline;
