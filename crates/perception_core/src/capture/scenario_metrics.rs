//! Reports a scenario's seed and iteration starts as dataset metrics.
//!
//! [`ScenarioMetricsSink`] is an [`EventSink`], so it plugs into
//! [`Scenario::tick`](crate::scenario::Scenario::tick) next to any other sink.
use tracing::warn;

use crate::capture::datamodel::{FrameIndex, Metric, MetricDefinition, ReportValue};
use crate::capture::dataset::{ConsumerEndpoint, DatasetCapture};
use crate::error::{Error, Result};
use crate::scenario::{EventSink, ScenarioEvent, ScenarioEventKind};

pub const RANDOM_SEED_METRIC_ID: &str = "random-seed";
pub const SCENARIO_ITERATION_METRIC_ID: &str = "scenario_iteration";

const RANDOM_SEED_DESCRIPTION: &str = "The random seed used to initialize the random state of \
    the simulation. Only triggered once per simulation.";
const SCENARIO_ITERATION_DESCRIPTION: &str = "Iteration information for dataset sequences";

pub fn random_seed_definition() -> MetricDefinition {
    MetricDefinition::new(RANDOM_SEED_METRIC_ID, RANDOM_SEED_DESCRIPTION)
}

pub fn scenario_iteration_definition() -> MetricDefinition {
    MetricDefinition::new(SCENARIO_ITERATION_METRIC_ID, SCENARIO_ITERATION_DESCRIPTION)
}

/// Turns scenario events into metrics on a borrowed [`DatasetCapture`].
///
/// - `ScenarioStarted` reports the configured seed once, as `[seed]`.
/// - `IterationStarted` reports `[{"iteration": n}]` on the iteration's first
///   frame.
///
/// Event sinks cannot fail, so the first report error is kept and returned by
/// [`finish`](Self::finish). Later events are still reported.
pub struct ScenarioMetricsSink<'a, E: ConsumerEndpoint> {
    capture: &'a mut DatasetCapture<E>,
    random_seed: MetricDefinition,
    iteration: MetricDefinition,
    error: Option<Error>,
}

impl<'a, E: ConsumerEndpoint> ScenarioMetricsSink<'a, E> {
    pub fn new(capture: &'a mut DatasetCapture<E>) -> Self {
        Self {
            capture,
            random_seed: random_seed_definition(),
            iteration: scenario_iteration_definition(),
            error: None,
        }
    }

    pub fn capture(&self) -> &DatasetCapture<E> {
        &*self.capture
    }

    /// Releases the capture, returning the first failed report if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn report(&mut self, frame: FrameIndex, metric: Metric) {
        if let Err(err) = self.capture.report_metric(frame, metric) {
            warn!(frame, %err, "scenario metric could not be reported");
            self.error.get_or_insert(err);
        }
    }
}

impl<E: ConsumerEndpoint> EventSink for ScenarioMetricsSink<'_, E> {
    fn send(&mut self, event: ScenarioEvent) {
        match event {
            ScenarioEvent::ScenarioStarted { config, frame, .. } => {
                let metric = Metric::new(&self.random_seed, None, frame, [config.random_seed]);
                self.report(frame, metric);
            }
            ScenarioEvent::IterationStarted {
                iteration, frame, ..
            } => {
                let values = [ReportValue::object([("iteration", iteration)])];
                let metric = Metric::new(&self.iteration, None, frame, values);
                self.report(frame, metric);
            }
            _ => {}
        }
    }

    fn wants(&self, kind: ScenarioEventKind) -> bool {
        matches!(
            kind,
            ScenarioEventKind::ScenarioStarted | ScenarioEventKind::IterationStarted
        )
    }
}
