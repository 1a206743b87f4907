//! Random hue offset of tagged objects.
use crate::error::{Error, Result};
use crate::parameter::{Parameter, ParameterSpec};
use crate::randomizer::{Randomizer, RandomizerContext};
use crate::sampler::SamplerSpec;
use crate::tags::{ObjectId, RandomizerTag};

/// Property name passed to [`SceneTarget::set_property`](crate::randomizer::SceneTarget::set_property).
pub const HUE_OFFSET_PROPERTY: &str = "hue_offset";

/// Marks objects whose material hue is offset by [`HueOffsetRandomizer`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct HueOffsetRandomizerTag;

impl RandomizerTag for HueOffsetRandomizerTag {}

/// Sets a random hue offset, in degrees, on every tagged object at iteration start.
///
/// Derived tag types are skipped.
#[derive(Debug, Clone)]
pub struct HueOffsetRandomizer {
    hue_offset: Parameter,
}

impl HueOffsetRandomizer {
    /// Uniform offset in [-180, 180] degrees.
    pub fn new() -> Result<Self> {
        Self::with_hue_offset(&ParameterSpec::float(SamplerSpec::uniform(-180.0, 180.0)))
    }

    pub fn with_hue_offset(spec: &ParameterSpec) -> Result<Self> {
        if !matches!(spec, ParameterSpec::Float { .. }) {
            return Err(Error::ParameterValidation(
                "hue offset must be a float parameter".into(),
            ));
        }
        Ok(Self {
            hue_offset: spec.validate()?,
        })
    }
}

impl Randomizer for HueOffsetRandomizer {
    fn on_iteration_start(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let objects: Vec<ObjectId> = ctx.tags.objects_with::<HueOffsetRandomizerTag>();
        for object in objects {
            let value = self.hue_offset.sample(&mut *ctx.random)?;
            ctx.target.set_property(object, HUE_OFFSET_PROPERTY, &value);
        }
        Ok(())
    }
}
