//! Random rotation of tagged objects.
use glam::{EulerRot, Quat, Vec3};

use crate::error::{Error, Result};
use crate::parameter::{Parameter, ParameterSpec};
use crate::randomizer::{Randomizer, RandomizerContext};
use crate::sampler::SamplerSpec;
use crate::tags::{ObjectId, RandomizerTag};

/// Marks objects whose rotation is randomized by [`RotationRandomizer`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RotationRandomizerTag;

impl RandomizerTag for RotationRandomizerTag {}

/// Converts Euler angles in degrees to a rotation applied Z first, then X, then Y.
pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

/// Assigns every tagged object a random rotation at the start of each iteration.
///
/// Only objects tagged with [`RotationRandomizerTag`] itself are rotated, not
/// those carrying a tag type derived from it.
#[derive(Debug, Clone)]
pub struct RotationRandomizer {
    rotation: Parameter,
}

impl RotationRandomizer {
    /// Uniform rotation in [0, 360] degrees on every axis.
    pub fn new() -> Result<Self> {
        Self::with_rotation(&ParameterSpec::vector3(
            SamplerSpec::uniform(0.0, 360.0),
            SamplerSpec::uniform(0.0, 360.0),
            SamplerSpec::uniform(0.0, 360.0),
        ))
    }

    /// Uses `spec`, a vector3 parameter of Euler angles in degrees.
    pub fn with_rotation(spec: &ParameterSpec) -> Result<Self> {
        if !matches!(spec, ParameterSpec::Vector3 { .. }) {
            return Err(Error::ParameterValidation(
                "rotation must be a vector3 parameter".into(),
            ));
        }
        Ok(Self {
            rotation: spec.validate()?,
        })
    }

    pub fn rotation(&self) -> &Parameter {
        &self.rotation
    }
}

impl Randomizer for RotationRandomizer {
    fn on_iteration_start(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let objects: Vec<ObjectId> = ctx.tags.objects_with::<RotationRandomizerTag>();
        for object in objects {
            let angles = self
                .rotation
                .sample(&mut *ctx.random)?
                .as_vector3()
                .ok_or_else(|| Error::Sampler("rotation did not yield a vector3".into()))?;
            ctx.target.set_rotation(object, euler_degrees(angles));
        }
        Ok(())
    }
}
