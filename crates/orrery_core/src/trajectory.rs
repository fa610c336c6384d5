//! Circular orbit trajectories
//!
//! An orbit is a circle of radius `r` in the XZ plane, centred on the
//! instance's static translation. The angle at frame `i` is
//! `speed * i + phase` where `speed = overall_speed / scale_x`, so larger
//! instances move more slowly.

use orrery_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// Global angular speed, divided by an instance's x scale
pub const OVERALL_SPEED: f64 = 0.0425;

/// One keyed position of a trajectory
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySample {
    pub frame: i64,
    pub position: Vec3,
}

/// Ordered orbit samples for frames `0..end_frame`
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
    angular_speed: f64,
}

impl Trajectory {
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Radians advanced per frame
    pub fn angular_step(&self) -> f64 {
        self.angular_speed
    }

    /// Position keyed at `frame`, if the trajectory covers it
    pub fn position_at(&self, frame: i64) -> Option<Vec3> {
        let index = usize::try_from(frame).ok()?;
        self.samples.get(index).map(|s| s.position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectorySample> {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectorySample;
    type IntoIter = std::slice::Iter<'a, TrajectorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Generates circular orbits with a configurable overall speed
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitGenerator {
    pub overall_speed: f64,
}

impl Default for OrbitGenerator {
    fn default() -> Self {
        Self { overall_speed: OVERALL_SPEED }
    }
}

impl OrbitGenerator {
    pub fn new(overall_speed: f64) -> Self {
        Self { overall_speed }
    }

    /// Radians per frame for an instance with x scale `scale_x`
    pub fn angular_speed(&self, scale_x: f64) -> Result<f64, ComposeError> {
        if !self.overall_speed.is_finite() {
            return Err(ComposeError::InvalidParameter(format!(
                "overall speed {} is not finite",
                self.overall_speed
            )));
        }
        if scale_x == 0.0 || !scale_x.is_finite() {
            return Err(ComposeError::InvalidParameter(format!(
                "orbit scale x must be finite and non-zero, got {}",
                scale_x
            )));
        }
        Ok(self.overall_speed / scale_x)
    }

    /// Sample the orbit for frames `0..end_frame`
    ///
    /// Frame `i` sits at angle `speed * i + phase_offset` on a circle of
    /// `radius` in the XZ plane. A negative `scale_x` reverses direction.
    pub fn generate(
        &self,
        radius: f64,
        scale_x: f64,
        end_frame: i64,
        phase_offset: i64,
    ) -> Result<Trajectory, ComposeError> {
        if !radius.is_finite() {
            return Err(ComposeError::InvalidParameter(format!("orbit radius {} is not finite", radius)));
        }
        if end_frame < 1 {
            return Err(ComposeError::InvalidParameter(format!(
                "end frame must be at least 1, got {}",
                end_frame
            )));
        }
        let speed = self.angular_speed(scale_x)?;
        let phase = phase_offset as f64;

        let samples = (0..end_frame)
            .map(|frame| {
                let theta = speed * frame as f64 + phase;
                TrajectorySample {
                    frame,
                    position: Vec3::new(theta.cos() * radius, 0.0, theta.sin() * radius),
                }
            })
            .collect();

        Ok(Trajectory { samples, angular_speed: speed })
    }
}

/// Sample an orbit using [`OVERALL_SPEED`]
pub fn generate_orbit(
    radius: f64,
    scale_x: f64,
    end_frame: i64,
    phase_offset: i64,
) -> Result<Trajectory, ComposeError> {
    OrbitGenerator::default().generate(radius, scale_x, end_frame, phase_offset)
}
