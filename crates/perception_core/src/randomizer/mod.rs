//! Randomizers: units of randomization driven by a scenario's lifecycle.
//!
//! A [`Randomizer`] reacts to scenario events (setup, iteration start/end, per-frame
//! updates, completion). Each hook receives a [`RandomizerContext`] giving access to the
//! scenario's tag registry, its per-iteration [`RandomState`] and the host
//! [`SceneTarget`]. All hooks default to doing nothing.
//!
//! The built-in randomizers select objects by their exact tag type through
//! [`TagManager::objects_with`]. Tags whose type derives from a randomizer's
//! tag are left alone; a custom randomizer can opt into subclasses with
//! [`TagManager::query`].
use std::any::Any;

use crate::error::Result;
use crate::rng::RandomState;
use crate::tags::TagManager;

pub mod hue_offset;
pub mod placement;
pub mod rotation;
pub mod sun_angle;
pub mod target;

pub use hue_offset::{HueOffsetRandomizer, HueOffsetRandomizerTag, HUE_OFFSET_PROPERTY};
pub use placement::ObjectPlacementRandomizer;
pub use rotation::{RotationRandomizer, RotationRandomizerTag};
pub use sun_angle::{SunAngleRandomizer, SunAngleRandomizerTag};
pub use target::{NullTarget, RecordingTarget, SceneTarget, TargetCommand};

/// Everything a randomizer hook may touch.
pub struct RandomizerContext<'a> {
    /// Tags registered with the scenario.
    pub tags: &'a mut TagManager,
    /// Generator reseeded at the start of every iteration.
    pub random: &'a mut RandomState,
    /// Host objects receiving randomized values.
    pub target: &'a mut dyn SceneTarget,
    /// Current iteration index.
    pub iteration: u32,
    /// Frame index within the current iteration.
    pub iteration_frame: u32,
    /// Frames stepped since the scenario was set up.
    pub frames_since_initialization: u64,
}

/// A unit of randomization.
///
/// A scenario holds at most one randomizer of each concrete type.
pub trait Randomizer: Any {
    /// Display name used in logs and events.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called once when the randomizer joins a scenario.
    fn on_awake(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once before the first iteration.
    fn on_scenario_start(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called at the start of every iteration, after the generator was reseeded.
    fn on_iteration_start(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called every frame while enabled.
    fn on_update(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called after every iteration.
    fn on_iteration_end(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once after the last iteration.
    fn on_scenario_complete(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called on the first update after the randomizer became enabled.
    fn on_start_running(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called on the first update after the randomizer became disabled.
    fn on_stop_running(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::ObjectId;

    struct Plain;
    impl Randomizer for Plain {}

    struct Counter {
        updates: u32,
    }

    impl Randomizer for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn on_update(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
            self.updates += 1;
            ctx.target
                .set_position(ObjectId(self.updates as u64), glam::Vec3::ZERO);
            Ok(())
        }
    }

    #[test]
    fn default_name_is_the_bare_type_name() {
        assert_eq!(Plain.name(), "Plain");
        assert_eq!(short_type_name("a::b::Thing<c::D>"), "Thing");
    }

    #[test]
    fn hooks_receive_the_context() {
        let mut tags = TagManager::new();
        let mut random = RandomState::new(1).unwrap();
        let mut target = RecordingTarget::new();
        let mut counter = Counter { updates: 0 };
        {
            let mut ctx = RandomizerContext {
                tags: &mut tags,
                random: &mut random,
                target: &mut target,
                iteration: 0,
                iteration_frame: 0,
                frames_since_initialization: 0,
            };
            counter.on_update(&mut ctx).unwrap();
            counter.on_update(&mut ctx).unwrap();
            counter.on_iteration_end(&mut ctx).unwrap();
        }
        assert_eq!(counter.updates, 2);
        assert_eq!(target.commands().len(), 2);
        assert_eq!(counter.name(), "counter");
    }
}
