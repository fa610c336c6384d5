//! Math value types for Orrery
//!
//! - [`Vec3`] - double precision 3D vector (positions, rotations, scales)
//! - [`Color3`] - linear RGB triple used for display colors

mod vec3;
mod color;

pub use vec3::Vec3;
pub use color::Color3;
