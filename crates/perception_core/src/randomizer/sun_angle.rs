//! Sun direction from time of day, day of year and latitude.
use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::error::{Error, Result};
use crate::parameter::{Parameter, ParameterSpec};
use crate::randomizer::rotation::euler_degrees;
use crate::randomizer::{Randomizer, RandomizerContext};
use crate::sampler::SamplerSpec;
use crate::tags::{ObjectId, RandomizerTag};

/// Axial tilt of the earth in degrees.
const EARTH_TILT_DEGREES: f32 = 23.5;

/// Marks directional lights rotated by [`SunAngleRandomizer`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SunAngleRandomizerTag;

impl RandomizerTag for SunAngleRandomizerTag {}

/// Rotation of a directional light for the sun position at `hour` (0 to 24) on
/// `day_of_year` (0 is January 1st) seen from `latitude` degrees.
pub fn sun_rotation(hour: f32, day_of_year: f32, latitude: f32) -> Quat {
    let earth_spin =
        Quat::from_axis_angle(Vec3::NEG_Y, ((hour + 12.0) / 24.0 * 360.0).to_radians());
    let time_of_year = day_of_year / 365.0 * TAU;
    let earth_tilt = euler_degrees(Vec3::new(
        time_of_year.cos() * EARTH_TILT_DEGREES,
        0.0,
        time_of_year.sin() * EARTH_TILT_DEGREES,
    ));
    let earth_latitude = Quat::from_axis_angle(Vec3::X, latitude.to_radians());
    let light = earth_tilt * earth_spin * earth_latitude;
    (euler_degrees(Vec3::new(90.0, 0.0, 0.0)) * light.inverse()).normalize()
}

/// Randomizes the sun angle of tagged lights at the start of each iteration.
///
/// Derived tag types are skipped.
#[derive(Debug, Clone)]
pub struct SunAngleRandomizer {
    hour: Parameter,
    day_of_year: Parameter,
    latitude: Parameter,
}

impl SunAngleRandomizer {
    /// Any hour, any day, any latitude.
    pub fn new() -> Result<Self> {
        Self::with_parameters(
            &ParameterSpec::float(SamplerSpec::uniform(0.0, 24.0)),
            &ParameterSpec::float(SamplerSpec::uniform(0.0, 365.0)),
            &ParameterSpec::float(SamplerSpec::uniform(-90.0, 90.0)),
        )
    }

    pub fn with_parameters(
        hour: &ParameterSpec,
        day_of_year: &ParameterSpec,
        latitude: &ParameterSpec,
    ) -> Result<Self> {
        Ok(Self {
            hour: float_parameter("hour", hour)?,
            day_of_year: float_parameter("day_of_year", day_of_year)?,
            latitude: float_parameter("latitude", latitude)?,
        })
    }
}

fn float_parameter(name: &str, spec: &ParameterSpec) -> Result<Parameter> {
    if !matches!(spec, ParameterSpec::Float { .. }) {
        return Err(Error::ParameterValidation(format!(
            "{name} must be a float parameter"
        )));
    }
    spec.validate()
}

fn sample_float(parameter: &Parameter, ctx: &mut RandomizerContext<'_>) -> Result<f32> {
    parameter
        .sample(&mut *ctx.random)?
        .as_float()
        .ok_or_else(|| Error::Sampler("float parameter did not yield a float".into()))
}

impl Randomizer for SunAngleRandomizer {
    fn on_iteration_start(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let lights: Vec<ObjectId> = ctx.tags.objects_with::<SunAngleRandomizerTag>();
        for light in lights {
            let hour = sample_float(&self.hour, ctx)?;
            let day = sample_float(&self.day_of_year, ctx)?;
            let latitude = sample_float(&self.latitude, ctx)?;
            ctx.target
                .set_rotation(light, sun_rotation(hour, day, latitude));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomizer::{RecordingTarget, TargetCommand};
    use crate::rng::RandomState;
    use crate::tags::TagManager;

    #[test]
    fn equator_noon_at_equinox_points_straight_down() {
        // Day 91.25 puts the tilt on the Z axis only, which does not affect
        // a light on the meridian at noon.
        let rotation = sun_rotation(12.0, 365.0 / 4.0, 0.0);
        let forward = rotation * Vec3::Z;
        assert!(forward.is_normalized());
        assert!(forward.y < -0.9, "forward was {forward}");
    }

    #[test]
    fn rotations_are_unit_quaternions() {
        for hour in [0.0, 6.0, 13.5, 23.9] {
            for latitude in [-90.0, -10.0, 45.0, 90.0] {
                let q = sun_rotation(hour, 200.0, latitude);
                assert!((q.length() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn tagged_lights_are_rotated() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(7), SunAngleRandomizerTag);
        let mut random = RandomState::new(5).unwrap();
        let mut target = RecordingTarget::new();
        let mut randomizer = SunAngleRandomizer::new().unwrap();
        let mut ctx = RandomizerContext {
            tags: &mut tags,
            random: &mut random,
            target: &mut target,
            iteration: 0,
            iteration_frame: 0,
            frames_since_initialization: 0,
        };
        randomizer.on_iteration_start(&mut ctx).unwrap();
        assert!(matches!(
            target.commands(),
            [TargetCommand::SetRotation(ObjectId(7), _)]
        ));
    }

    #[test]
    fn non_float_parameters_are_rejected() {
        let bad = SunAngleRandomizer::with_parameters(
            &ParameterSpec::coin(),
            &ParameterSpec::float(SamplerSpec::default()),
            &ParameterSpec::float(SamplerSpec::default()),
        );
        assert!(matches!(bad, Err(Error::ParameterValidation(_))));
    }
}
