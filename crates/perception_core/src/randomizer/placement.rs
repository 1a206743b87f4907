//! Layers of evenly spaced prefab instances placed with Poisson disk sampling.
use glam::{Vec2, Vec3};
use tracing::debug;

use crate::error::{Error, Result};
use crate::parameter::{CategoricalParameter, CategoricalSpec};
use crate::randomizer::{Randomizer, RandomizerContext};
use crate::sampling::PoissonDiskSampling;

/// Places randomly chosen prefabs over a 2D area at the start of every iteration
/// and clears them when the iteration ends.
///
/// The area is centered on the origin of the XY plane. Layer `i` sits at
/// `depth + separation_distance * i` on Z.
#[derive(Debug, Clone)]
pub struct ObjectPlacementRandomizer {
    /// Z offset of the first layer.
    pub depth: f32,
    /// Number of layers generated per iteration.
    pub layer_count: u32,
    /// Size of the placement area.
    pub placement_area: Vec2,
    sampling: PoissonDiskSampling,
    prefabs: CategoricalParameter<String>,
    placed: usize,
}

impl ObjectPlacementRandomizer {
    pub fn new(placement_area: Vec2, prefabs: &CategoricalSpec<String>) -> Result<Self> {
        Ok(Self {
            depth: 0.0,
            layer_count: 1,
            placement_area,
            sampling: PoissonDiskSampling::new(2.0),
            prefabs: prefabs.validate()?,
            placed: 0,
        })
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_layer_count(mut self, layer_count: u32) -> Self {
        self.layer_count = layer_count;
        self
    }

    /// Minimum distance between placed objects.
    pub fn with_separation_distance(mut self, separation_distance: f32) -> Self {
        self.sampling.minimum_radius = separation_distance;
        self
    }

    pub fn separation_distance(&self) -> f32 {
        self.sampling.minimum_radius
    }

    /// Instances placed during the current iteration.
    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn validate(&self) -> Result<()> {
        self.sampling.validate()?;
        if !(self.placement_area.x >= 0.0 && self.placement_area.y >= 0.0)
            || !self.placement_area.is_finite()
        {
            return Err(Error::InvalidConfig(format!(
                "placement area {} must be finite and non-negative",
                self.placement_area
            )));
        }
        Ok(())
    }
}

impl Randomizer for ObjectPlacementRandomizer {
    fn on_awake(&mut self, _ctx: &mut RandomizerContext<'_>) -> Result<()> {
        self.validate()
    }

    fn on_iteration_start(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        let offset = -self.placement_area * 0.5;
        for layer in 0..self.layer_count {
            let seed = ctx.random.next_nonzero_seed();
            let points =
                self.sampling
                    .generate(self.placement_area.x, self.placement_area.y, seed)?;
            let z = self.depth + self.separation_distance() * layer as f32;
            for point in points {
                let prefab = self.prefabs.sample(&mut *ctx.random)?;
                let position = Vec3::new(point.x + offset.x, point.y + offset.y, z);
                ctx.target.place_instance(prefab, position);
                self.placed += 1;
            }
        }
        debug!(
            placed = self.placed,
            iteration = ctx.iteration,
            "placed foreground objects"
        );
        Ok(())
    }

    fn on_iteration_end(&mut self, ctx: &mut RandomizerContext<'_>) -> Result<()> {
        ctx.target.clear_instances();
        self.placed = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomizer::RecordingTarget;
    use crate::rng::RandomState;
    use crate::tags::TagManager;

    fn prefabs() -> CategoricalSpec<String> {
        CategoricalSpec::weighted([("crate".to_string(), 3.0), ("barrel".to_string(), 1.0)])
    }

    #[test]
    fn places_instances_inside_the_centered_area() {
        let mut randomizer = ObjectPlacementRandomizer::new(Vec2::new(10.0, 6.0), &prefabs())
            .unwrap()
            .with_depth(4.0)
            .with_separation_distance(1.5);
        let mut tags = TagManager::new();
        let mut random = RandomState::new(77).unwrap();
        let mut target = RecordingTarget::new();
        let mut ctx = RandomizerContext {
            tags: &mut tags,
            random: &mut random,
            target: &mut target,
            iteration: 0,
            iteration_frame: 0,
            frames_since_initialization: 0,
        };
        randomizer.on_awake(&mut ctx).unwrap();
        randomizer.on_iteration_start(&mut ctx).unwrap();
        let placed = randomizer.placed();
        assert!(placed > 1);

        let live = target.live_instances();
        assert_eq!(live.len(), placed);
        for (category, position) in live {
            assert!(category == "crate" || category == "barrel");
            assert!((-5.0..5.0).contains(&position.x));
            assert!((-3.0..3.0).contains(&position.y));
            assert_eq!(position.z, 4.0);
        }
    }

    #[test]
    fn iteration_end_clears_instances() {
        let mut randomizer =
            ObjectPlacementRandomizer::new(Vec2::new(8.0, 8.0), &prefabs()).unwrap();
        let mut tags = TagManager::new();
        let mut random = RandomState::new(3).unwrap();
        let mut target = RecordingTarget::new();
        let mut ctx = RandomizerContext {
            tags: &mut tags,
            random: &mut random,
            target: &mut target,
            iteration: 0,
            iteration_frame: 0,
            frames_since_initialization: 0,
        };
        randomizer.on_iteration_start(&mut ctx).unwrap();
        randomizer.on_iteration_end(&mut ctx).unwrap();
        assert_eq!(randomizer.placed(), 0);
        assert!(target.live_instances().is_empty());
    }

    #[test]
    fn layers_stack_along_z() {
        let mut randomizer = ObjectPlacementRandomizer::new(Vec2::new(6.0, 6.0), &prefabs())
            .unwrap()
            .with_layer_count(3)
            .with_separation_distance(1.0)
            .with_depth(10.0);
        let mut tags = TagManager::new();
        let mut random = RandomState::new(9).unwrap();
        let mut target = RecordingTarget::new();
        let mut ctx = RandomizerContext {
            tags: &mut tags,
            random: &mut random,
            target: &mut target,
            iteration: 0,
            iteration_frame: 0,
            frames_since_initialization: 0,
        };
        randomizer.on_iteration_start(&mut ctx).unwrap();
        let mut depths: Vec<f32> = target
            .live_instances()
            .iter()
            .map(|(_, p)| p.z)
            .collect();
        depths.dedup();
        assert_eq!(depths, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn invalid_configuration_fails_on_awake() {
        let mut randomizer = ObjectPlacementRandomizer::new(Vec2::new(-1.0, 5.0), &prefabs())
            .unwrap();
        let mut tags = TagManager::new();
        let mut random = RandomState::new(1).unwrap();
        let mut target = RecordingTarget::new();
        let mut ctx = RandomizerContext {
            tags: &mut tags,
            random: &mut random,
            target: &mut target,
            iteration: 0,
            iteration_frame: 0,
            frames_since_initialization: 0,
        };
        assert!(matches!(
            randomizer.on_awake(&mut ctx),
            Err(Error::InvalidConfig(_))
        ));
        assert!(ObjectPlacementRandomizer::new(Vec2::ONE, &CategoricalSpec::uniform(Vec::new()))
            .is_err());
    }
}
