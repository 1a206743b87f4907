//! Scenario: the iteration state machine that drives randomizers.
//!
//! The host calls [`Scenario::tick`] once per rendered frame. Each tick runs the
//! following steps, in order:
//! 1. on the first tick, set up every randomizer (`on_awake`, `on_scenario_start`);
//! 2. if the current iteration has run all of its frames, end it (`on_iteration_end`)
//!    and advance the iteration counter;
//! 3. if every iteration has run, complete the scenario (`on_scenario_complete`);
//! 4. on the first frame of an iteration, reseed the generator by hashing the
//!    iteration index with the configured seed ([`iterate_seed`], never zero), then
//!    start the iteration (`on_iteration_start`);
//! 5. update every randomizer, firing `on_start_running`/`on_stop_running` on
//!    enable transitions;
//! 6. advance the frame counters.
//!
//! Only enabled randomizers receive iteration and completion hooks.
use std::any::{Any, TypeId};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::randomizer::{Randomizer, RandomizerContext, SceneTarget};
use crate::rng::{iterate_seed, RandomState};
use crate::tags::TagManager;

pub mod config;
pub mod events;

pub use config::ScenarioConfig;
pub use events::{
    EventSink, FilterSink, FnSink, MultiSink, ScenarioEvent, ScenarioEventKind, VecSink,
};

/// Where a scenario is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    /// No tick has run yet.
    AwaitingSetup,
    /// Randomizers are set up; no iteration has started.
    Running,
    /// An iteration is in progress.
    Iterating,
    /// Every iteration has run. Further ticks do nothing.
    Complete,
}

struct Slot {
    randomizer: Box<dyn Randomizer>,
    enabled: bool,
    previously_enabled: bool,
    awake: bool,
}

impl Slot {
    fn type_id(&self) -> TypeId {
        let any: &dyn Any = &*self.randomizer;
        any.type_id()
    }
}

/// A scenario run: configuration, tag registry, randomizers and counters.
pub struct Scenario {
    config: ScenarioConfig,
    tags: TagManager,
    slots: Vec<Slot>,
    state: ScenarioState,
    current_iteration: u32,
    current_iteration_frame: u32,
    frames_since_initialization: u64,
    random: RandomState,
}

impl Scenario {
    /// Creates a scenario after validating `config`.
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        let random = RandomState::new(config.random_seed)?;
        Ok(Self {
            config,
            tags: TagManager::new(),
            slots: Vec::new(),
            state: ScenarioState::AwaitingSetup,
            current_iteration: 0,
            current_iteration_frame: 0,
            frames_since_initialization: 0,
            random,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == ScenarioState::Complete
    }

    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    pub fn current_iteration_frame(&self) -> u32 {
        self.current_iteration_frame
    }

    pub fn frames_since_initialization(&self) -> u64 {
        self.frames_since_initialization
    }

    pub fn tags(&self) -> &TagManager {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagManager {
        &mut self.tags
    }

    /// The generator randomizers draw from during the current iteration.
    pub fn random(&mut self) -> &mut RandomState {
        &mut self.random
    }

    /// Appends a randomizer. Fails if one of the same type is already present.
    pub fn add_randomizer<R: Randomizer>(&mut self, randomizer: R) -> Result<()> {
        self.insert_boxed(self.slots.len(), Box::new(randomizer))
    }

    /// Inserts a randomizer at `index`. Fails if one of the same type is already present.
    pub fn insert_randomizer<R: Randomizer>(&mut self, index: usize, randomizer: R) -> Result<()> {
        self.insert_boxed(index, Box::new(randomizer))
    }

    /// Inserts an already boxed randomizer at `index`.
    ///
    /// Randomizers added after setup are awakened on the next tick.
    pub fn insert_boxed(&mut self, index: usize, randomizer: Box<dyn Randomizer>) -> Result<()> {
        if self.is_complete() {
            return Err(Error::Scenario(
                "cannot add a randomizer to a completed scenario".into(),
            ));
        }
        if index > self.slots.len() {
            return Err(Error::Scenario(format!(
                "randomizer index {index} out of range (len {})",
                self.slots.len()
            )));
        }
        let new_type = {
            let any: &dyn Any = &*randomizer;
            any.type_id()
        };
        if self.slots.iter().any(|slot| slot.type_id() == new_type) {
            return Err(Error::Scenario(format!(
                "cannot add another randomizer of type {} when one is already present",
                randomizer.name()
            )));
        }
        debug!(randomizer = randomizer.name(), index, "adding randomizer");
        self.slots.insert(
            index,
            Slot {
                randomizer,
                enabled: true,
                previously_enabled: false,
                awake: false,
            },
        );
        Ok(())
    }

    /// Removes and returns the randomizer at `index`.
    pub fn remove_randomizer_at(&mut self, index: usize) -> Result<Box<dyn Randomizer>> {
        if index >= self.slots.len() {
            return Err(Error::Scenario(format!(
                "randomizer index {index} out of range (len {})",
                self.slots.len()
            )));
        }
        Ok(self.slots.remove(index).randomizer)
    }

    /// The randomizer of type `T`, if present.
    pub fn randomizer<T: Randomizer>(&self) -> Option<&T> {
        self.slots.iter().find_map(|slot| {
            let any: &dyn Any = &*slot.randomizer;
            any.downcast_ref::<T>()
        })
    }

    pub fn randomizer_mut<T: Randomizer>(&mut self) -> Option<&mut T> {
        self.slots.iter_mut().find_map(|slot| {
            let any: &mut dyn Any = &mut *slot.randomizer;
            any.downcast_mut::<T>()
        })
    }

    /// Randomizers in dispatch order.
    pub fn randomizers(&self) -> impl Iterator<Item = &dyn Randomizer> + '_ {
        self.slots.iter().map(|slot| &*slot.randomizer)
    }

    pub fn randomizer_count(&self) -> usize {
        self.slots.len()
    }

    /// Enables or disables the randomizer at `index`.
    ///
    /// The matching start/stop hook fires on the next update.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<()> {
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            Error::Scenario(format!("randomizer index {index} out of range"))
        })?;
        slot.enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self, index: usize) -> Option<bool> {
        self.slots.get(index).map(|slot| slot.enabled)
    }

    /// Steps one host frame. Returns the state after the step.
    pub fn tick(
        &mut self,
        target: &mut dyn SceneTarget,
        sink: &mut dyn EventSink,
    ) -> Result<ScenarioState> {
        if self.state == ScenarioState::Complete {
            return Ok(ScenarioState::Complete);
        }

        if self.state == ScenarioState::AwaitingSetup {
            self.awaken_pending(target)?;
            self.dispatch(target, false, |r, ctx| r.on_scenario_start(ctx))?;
            self.state = ScenarioState::Running;
            info!(
                randomizers = self.slots.len(),
                total_iterations = self.config.total_iterations,
                "scenario started"
            );
            if self.config.total_iterations == 0 {
                warn!("scenario has no iterations and completes immediately");
                if sink.wants(ScenarioEventKind::Warning) {
                    sink.send(ScenarioEvent::Warning {
                        context: "scenario".into(),
                        message: "total_iterations is 0".into(),
                    });
                }
            }
            if sink.wants(ScenarioEventKind::ScenarioStarted) {
                sink.send(ScenarioEvent::ScenarioStarted {
                    config: self.config.clone(),
                    randomizer_count: self.slots.len(),
                    frame: self.frames_since_initialization,
                });
            }
        } else {
            self.awaken_pending(target)?;
        }

        if self.state == ScenarioState::Iterating
            && self.current_iteration_frame >= self.config.frames_per_iteration
        {
            self.dispatch(target, true, |r, ctx| r.on_iteration_end(ctx))?;
            let finished = self.current_iteration;
            let frames = self.current_iteration_frame;
            self.current_iteration += 1;
            self.current_iteration_frame = 0;
            if sink.wants(ScenarioEventKind::IterationFinished) {
                sink.send(ScenarioEvent::IterationFinished {
                    iteration: finished,
                    frames,
                });
            }
        }

        if self.current_iteration >= self.config.total_iterations {
            self.dispatch(target, true, |r, ctx| r.on_scenario_complete(ctx))?;
            self.state = ScenarioState::Complete;
            info!(
                iterations = self.current_iteration,
                frames = self.frames_since_initialization,
                "scenario complete"
            );
            if sink.wants(ScenarioEventKind::ScenarioCompleted) {
                sink.send(ScenarioEvent::ScenarioCompleted {
                    iterations: self.current_iteration,
                    frames: self.frames_since_initialization,
                });
            }
            return Ok(self.state);
        }

        if self.current_iteration_frame == 0 {
            let seed = iterate_seed(self.current_iteration, self.config.random_seed);
            self.random = RandomState::new(seed)?;
            self.state = ScenarioState::Iterating;
            debug!(iteration = self.current_iteration, seed, "iteration started");
            self.dispatch(target, true, |r, ctx| r.on_iteration_start(ctx))?;
            if sink.wants(ScenarioEventKind::IterationStarted) {
                sink.send(ScenarioEvent::IterationStarted {
                    iteration: self.current_iteration,
                    seed,
                    frame: self.frames_since_initialization,
                });
            }
        }

        self.update_all(target)?;

        self.current_iteration_frame += 1;
        self.frames_since_initialization += 1;
        Ok(self.state)
    }

    /// Ticks until the scenario completes or `max_ticks` ticks have run.
    ///
    /// Returns the number of ticks stepped.
    pub fn run_to_completion(
        &mut self,
        target: &mut dyn SceneTarget,
        sink: &mut dyn EventSink,
        max_ticks: u64,
    ) -> Result<u64> {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_complete() {
            self.tick(target, sink)?;
            ticks += 1;
        }
        if !self.is_complete() {
            warn!(max_ticks, "scenario did not complete within the tick budget");
        }
        Ok(ticks)
    }

    fn awaken_pending(&mut self, target: &mut dyn SceneTarget) -> Result<()> {
        let Scenario {
            tags,
            slots,
            random,
            current_iteration,
            current_iteration_frame,
            frames_since_initialization,
            ..
        } = self;
        for slot in slots.iter_mut().filter(|slot| !slot.awake) {
            let mut ctx = RandomizerContext {
                tags: &mut *tags,
                random: &mut *random,
                target: &mut *target,
                iteration: *current_iteration,
                iteration_frame: *current_iteration_frame,
                frames_since_initialization: *frames_since_initialization,
            };
            slot.randomizer.on_awake(&mut ctx)?;
            slot.awake = true;
        }
        Ok(())
    }

    fn dispatch<F>(
        &mut self,
        target: &mut dyn SceneTarget,
        only_enabled: bool,
        mut hook: F,
    ) -> Result<()>
    where
        F: FnMut(&mut dyn Randomizer, &mut RandomizerContext<'_>) -> Result<()>,
    {
        let Scenario {
            tags,
            slots,
            random,
            current_iteration,
            current_iteration_frame,
            frames_since_initialization,
            ..
        } = self;
        for slot in slots.iter_mut() {
            if only_enabled && !slot.enabled {
                continue;
            }
            let mut ctx = RandomizerContext {
                tags: &mut *tags,
                random: &mut *random,
                target: &mut *target,
                iteration: *current_iteration,
                iteration_frame: *current_iteration_frame,
                frames_since_initialization: *frames_since_initialization,
            };
            hook(&mut *slot.randomizer, &mut ctx)?;
        }
        Ok(())
    }

    fn update_all(&mut self, target: &mut dyn SceneTarget) -> Result<()> {
        let Scenario {
            tags,
            slots,
            random,
            current_iteration,
            current_iteration_frame,
            frames_since_initialization,
            ..
        } = self;
        for slot in slots.iter_mut() {
            let mut ctx = RandomizerContext {
                tags: &mut *tags,
                random: &mut *random,
                target: &mut *target,
                iteration: *current_iteration,
                iteration_frame: *current_iteration_frame,
                frames_since_initialization: *frames_since_initialization,
            };
            if slot.enabled {
                if !slot.previously_enabled {
                    slot.previously_enabled = true;
                    slot.randomizer.on_start_running(&mut ctx)?;
                }
                slot.randomizer.on_update(&mut ctx)?;
            } else if slot.previously_enabled {
                slot.previously_enabled = false;
                slot.randomizer.on_stop_running(&mut ctx)?;
            }
        }
        Ok(())
    }
}
