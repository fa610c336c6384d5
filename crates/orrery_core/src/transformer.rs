//! Instance transforms
//!
//! Authors an instance's static transform ops and, when requested, its
//! animated orbit channel. The orbit is a separate translate op so the
//! instance's position at frame `i` is its static translation plus the orbit
//! sample at `i`.

use orrery_stage::{PrimPath, Stage, Value};

use crate::descriptor::InstanceDescriptor;
use crate::error::ComposeError;
use crate::phase::PhaseSource;
use crate::trajectory::OrbitGenerator;

/// Suffix of the animated orbit op (`xformOp:translate:orbit`)
pub const ORBIT_OP_SUFFIX: &str = "orbit";

/// Per-instance inputs to [`apply_transform`] beyond the descriptor
#[derive(Clone, Copy, Debug)]
pub struct TransformContext<'a> {
    /// Position of the instance in the descriptor list
    pub index: usize,
    /// Orbits are sampled for frames `0..end_frame`
    pub end_frame: i64,
    pub orbit: &'a OrbitGenerator,
}

/// Author the transform ops described by `descriptor` on the prim at `path`
///
/// Ops are added in the order translate, rotate, scale, orbit. Everything is
/// validated before the stage is touched, so a failed call leaves the prim
/// as it was.
pub fn apply_transform(
    stage: &mut Stage,
    path: &PrimPath,
    descriptor: &InstanceDescriptor,
    ctx: &TransformContext<'_>,
    phases: &mut dyn PhaseSource,
) -> Result<(), ComposeError> {
    descriptor.validate_finite()?;

    let orbit = match descriptor.orbit_radius()? {
        Some(radius) => {
            let scale = descriptor
                .scale()
                .ok_or(ComposeError::MissingScaleForOrbit { index: ctx.index })?;
            let phase = phases.phase_offset(ctx.index, ctx.end_frame);
            log::debug!("{}: orbit radius {} with phase offset {}", path, radius, phase);
            Some(ctx.orbit.generate(radius, scale.x, ctx.end_frame, phase)?)
        }
        None => None,
    };

    if let Some(translate) = descriptor.translate() {
        stage.set_translate(path, translate)?;
    }
    if let Some(rotate) = descriptor.rotate() {
        stage.set_rotate(path, rotate)?;
    }
    if let Some(scale) = descriptor.scale() {
        stage.set_scale(path, scale)?;
    }
    if let Some(trajectory) = orbit {
        let op = stage.add_translate_op(path, ORBIT_OP_SUFFIX)?;
        for sample in &trajectory {
            stage.set_time_sample(path, &op, sample.frame, Value::Double3(sample.position))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::FixedPhase;
    use crate::shape::ShapeKind;
    use orrery_math::Vec3;
    use orrery_stage::tokens;

    const EPSILON: f64 = 1e-9;

    fn setup() -> (Stage, PrimPath) {
        let mut stage = Stage::new("Test");
        let path = PrimPath::new("/MyScene/shape0").unwrap();
        stage.define_prim(&path, None).unwrap();
        (stage, path)
    }

    fn ctx(generator: &OrbitGenerator) -> TransformContext<'_> {
        TransformContext { index: 0, end_frame: 720, orbit: generator }
    }

    #[test]
    fn test_static_ops_in_order() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let d = InstanceDescriptor::new(ShapeKind::Cube, "Red")
            .with_translate(Vec3::new(1.0, 2.0, 3.0))
            .with_rotate(Vec3::new(0.0, 90.0, 0.0))
            .with_scale(Vec3::splat(2.0));
        apply_transform(&mut stage, &path, &d, &ctx(&generator), &mut FixedPhase(0)).unwrap();

        let spec = stage.prim(&path).unwrap();
        assert_eq!(spec.xform_op_order, vec![tokens::TRANSLATE, tokens::ROTATE_XYZ, tokens::SCALE]);
        assert_eq!(
            spec.attribute(tokens::ROTATE_XYZ).unwrap().default,
            Some(Value::Double3(Vec3::new(0.0, 90.0, 0.0)))
        );
        assert!(!spec.attributes.values().any(|a| a.is_animated()));
    }

    #[test]
    fn test_no_transform_fields() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let d = InstanceDescriptor::new(ShapeKind::Sphere, "Red");
        apply_transform(&mut stage, &path, &d, &ctx(&generator), &mut FixedPhase(0)).unwrap();
        let spec = stage.prim(&path).unwrap();
        assert!(spec.xform_op_order.is_empty());
        assert!(spec.attributes.is_empty());
    }

    #[test]
    fn test_orbit_samples() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let d = InstanceDescriptor::new(ShapeKind::Cube, "Red")
            .with_scale(Vec3::ONE)
            .with_orbit(7.0);
        apply_transform(&mut stage, &path, &d, &ctx(&generator), &mut FixedPhase(0)).unwrap();

        let spec = stage.prim(&path).unwrap();
        assert_eq!(spec.xform_op_order, vec![tokens::SCALE, "xformOp:translate:orbit"]);
        let orbit = spec.attribute("xformOp:translate:orbit").unwrap();
        assert_eq!(orbit.time_samples.len(), 720);
        let first = orbit.time_samples[&0].as_vec3().unwrap();
        assert!(first.abs_diff_eq(Vec3::new(7.0, 0.0, 0.0), EPSILON));
    }

    #[test]
    fn test_orbit_adds_to_static_translate() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let d = InstanceDescriptor::new(ShapeKind::Sphere, "Red")
            .with_translate(Vec3::new(0.0, 5.0, 0.0))
            .with_scale(Vec3::ONE)
            .with_orbit(2.0);
        apply_transform(&mut stage, &path, &d, &ctx(&generator), &mut FixedPhase(0)).unwrap();

        let at_zero = stage.translation_at(&path, 0.0).unwrap();
        assert!(at_zero.abs_diff_eq(Vec3::new(2.0, 5.0, 0.0), EPSILON));

        let theta = 100.0 * crate::trajectory::OVERALL_SPEED;
        let at_hundred = stage.translation_at(&path, 100.0).unwrap();
        assert!(at_hundred.abs_diff_eq(Vec3::new(theta.cos() * 2.0, 5.0, theta.sin() * 2.0), EPSILON));
    }

    #[test]
    fn test_orbit_without_scale_fails() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let d = InstanceDescriptor::new(ShapeKind::Cube, "Red")
            .with_translate(Vec3::X)
            .with_orbit(3.0);
        let context = TransformContext { index: 4, end_frame: 720, orbit: &generator };
        let err = apply_transform(&mut stage, &path, &d, &context, &mut FixedPhase(0)).unwrap_err();
        assert!(matches!(err, ComposeError::MissingScaleForOrbit { index: 4 }));
        assert!(stage.prim(&path).unwrap().xform_op_order.is_empty());
    }

    #[test]
    fn test_empty_orbit_is_static() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let mut d = InstanceDescriptor::new(ShapeKind::Sphere, "Red").with_scale(Vec3::ONE);
        d.orbit = Some(Vec::new());
        apply_transform(&mut stage, &path, &d, &ctx(&generator), &mut FixedPhase(0)).unwrap();

        let spec = stage.prim(&path).unwrap();
        assert_eq!(spec.xform_op_order, vec![tokens::SCALE]);
        assert!(spec.attribute("xformOp:translate:orbit").is_none());
        assert!(!spec.attributes.values().any(|a| a.is_animated()));
    }

    #[test]
    fn test_empty_orbit_without_scale_is_static() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let mut d = InstanceDescriptor::new(ShapeKind::Cube, "Red");
        d.orbit = Some(Vec::new());
        apply_transform(&mut stage, &path, &d, &ctx(&generator), &mut FixedPhase(0)).unwrap();
        assert!(stage.prim(&path).unwrap().xform_op_order.is_empty());
    }

    #[test]
    fn test_zero_scale_orbit_fails() {
        let (mut stage, path) = setup();
        let generator = OrbitGenerator::default();
        let d = InstanceDescriptor::new(ShapeKind::Cube, "Red")
            .with_scale(Vec3::new(0.0, 1.0, 1.0))
            .with_orbit(3.0);
        let err = apply_transform(&mut stage, &path, &d, &ctx(&generator), &mut FixedPhase(0)).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidParameter(_)));
    }
}
