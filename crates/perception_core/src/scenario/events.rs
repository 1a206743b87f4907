//! Event types and sinks for observing scenario runs.
//!
//! This module defines [`ScenarioEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while stepping a [`crate::scenario::Scenario`].
use crate::scenario::config::ScenarioConfig;

/// Describes events emitted by a scenario.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioEvent {
    /// Emitted once, after every randomizer was set up.
    ScenarioStarted {
        /// The configuration the scenario runs with.
        config: ScenarioConfig,
        /// Number of randomizers in the scenario.
        randomizer_count: usize,
        /// Frames stepped since setup when the event fired.
        frame: u64,
    },

    /// Emitted when an iteration starts, after the generator was reseeded.
    IterationStarted {
        /// Index of the iteration.
        iteration: u32,
        /// Seed the iteration's generator was created from.
        seed: u32,
        /// Frames stepped since setup when the iteration started.
        frame: u64,
    },

    /// Emitted when an iteration has run all of its frames.
    IterationFinished {
        /// Index of the finished iteration.
        iteration: u32,
        /// Frames the iteration ran for.
        frames: u32,
    },

    /// Emitted once, when the last iteration finished.
    ScenarioCompleted {
        /// Number of iterations run.
        iterations: u32,
        /// Frames stepped since setup.
        frames: u64,
    },

    /// Non-fatal warning generated during the run.
    Warning {
        /// Context string (e.g. randomizer name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`ScenarioEvent`], used to filter what a sink receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioEventKind {
    ScenarioStarted,
    IterationStarted,
    IterationFinished,
    ScenarioCompleted,
    Warning,
}

impl ScenarioEvent {
    pub fn kind(&self) -> ScenarioEventKind {
        match self {
            ScenarioEvent::ScenarioStarted { .. } => ScenarioEventKind::ScenarioStarted,
            ScenarioEvent::IterationStarted { .. } => ScenarioEventKind::IterationStarted,
            ScenarioEvent::IterationFinished { .. } => ScenarioEventKind::IterationFinished,
            ScenarioEvent::ScenarioCompleted { .. } => ScenarioEventKind::ScenarioCompleted,
            ScenarioEvent::Warning { .. } => ScenarioEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`ScenarioEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: ScenarioEvent);

    /// Whether events of `kind` should be built and sent at all.
    fn wants(&self, kind: ScenarioEventKind) -> bool {
        let _ = kind;
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = ScenarioEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: ScenarioEvent) {}

    #[inline]
    fn wants(&self, _kind: ScenarioEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(ScenarioEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ScenarioEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ScenarioEvent),
{
    #[inline]
    fn send(&mut self, event: ScenarioEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Vec<ScenarioEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<ScenarioEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[ScenarioEvent] {
        &self.events
    }

    /// Kinds of the collected events, in order.
    pub fn kinds(&self) -> Vec<ScenarioEventKind> {
        self.events.iter().map(ScenarioEvent::kind).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: ScenarioEvent) {
        self.events.push(event);
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: ScenarioEvent) {
        let kind = event.kind();
        let mut targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some(last) = targets.pop() else {
            return;
        };
        for i in targets {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: ScenarioEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

/// Sink that only forwards the listed kinds.
pub struct FilterSink<S: EventSink> {
    inner: S,
    kinds: Vec<ScenarioEventKind>,
}

impl<S: EventSink> FilterSink<S> {
    pub fn new(inner: S, kinds: impl IntoIterator<Item = ScenarioEventKind>) -> Self {
        Self {
            inner,
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for FilterSink<S> {
    fn send(&mut self, event: ScenarioEvent) {
        if self.wants(event.kind()) {
            self.inner.send(event);
        }
    }

    fn wants(&self, kind: ScenarioEventKind) -> bool {
        self.kinds.contains(&kind) && self.inner.wants(kind)
    }
}
