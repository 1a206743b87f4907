//! Per-session capture context that holds frames back until every future resolved.
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::capture::datamodel::{
    Annotation, AnnotationDefinition, FrameIndex, Metric, MetricDefinition, SensorId,
};
use crate::capture::future::{AsyncFuture, FutureKind};
use crate::error::{Error, Result};

static NEXT_CAPTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Everything reported for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameData {
    pub frame: FrameIndex,
    pub annotations: Vec<Annotation>,
    pub metrics: Vec<Metric>,
}

/// Receives completed frames.
///
/// The frame is borrowed; it leaves the capture's queue only once the
/// endpoint accepted it.
pub trait ConsumerEndpoint {
    fn write_frame(&mut self, frame: &FrameData) -> Result<()>;
}

/// Endpoint that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct VecEndpoint {
    frames: Vec<FrameData>,
}

impl VecEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[FrameData] {
        &self.frames
    }

    pub fn into_inner(self) -> Vec<FrameData> {
        self.frames
    }
}

impl ConsumerEndpoint for VecEndpoint {
    fn write_frame(&mut self, frame: &FrameData) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

struct Expected {
    kind: FutureKind,
    definition: String,
    sensor: Option<SensorId>,
}

#[derive(Default)]
struct PendingFrame {
    outstanding: HashMap<u64, Expected>,
    data: FrameData,
}

/// Collects annotations and metrics and forwards each frame to the endpoint
/// once nothing on it is pending.
///
/// Frames reach the endpoint in the order they complete, which need not be
/// frame order.
pub struct DatasetCapture<E: ConsumerEndpoint> {
    endpoint: E,
    id: u64,
    next_future: u64,
    pending: BTreeMap<FrameIndex, PendingFrame>,
    ready: VecDeque<FrameData>,
}

impl<E: ConsumerEndpoint> DatasetCapture<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            id: NEXT_CAPTURE_ID.fetch_add(1, Ordering::Relaxed),
            next_future: 0,
            pending: BTreeMap::new(),
            ready: VecDeque::new(),
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }

    /// Reserves an annotation slot on `frame`.
    pub fn report_annotation_async(
        &mut self,
        frame: FrameIndex,
        sensor: SensorId,
        definition: &AnnotationDefinition,
    ) -> AsyncFuture<Annotation> {
        let id = self.reserve(frame, FutureKind::Annotation, &definition.id, Some(sensor));
        AsyncFuture::new(self.id, id, frame)
    }

    /// Reserves a metric slot on `frame`.
    pub fn create_async_metric(
        &mut self,
        frame: FrameIndex,
        definition: &MetricDefinition,
        sensor: Option<SensorId>,
    ) -> AsyncFuture<Metric> {
        let id = self.reserve(frame, FutureKind::Metric, &definition.id, sensor);
        AsyncFuture::new(self.id, id, frame)
    }

    /// Reports a metric right away.
    ///
    /// It joins its frame if that frame still waits on futures, otherwise it
    /// is written on its own.
    pub fn report_metric(&mut self, frame: FrameIndex, mut metric: Metric) -> Result<()> {
        metric.frame = frame;
        match self.pending.get_mut(&frame) {
            Some(pending) => pending.data.metrics.push(metric),
            None => self.ready.push_back(FrameData {
                frame,
                annotations: Vec::new(),
                metrics: vec![metric],
            }),
        }
        self.flush_ready()
    }

    /// Resolves an annotation future.
    pub fn report_annotation(
        &mut self,
        future: AsyncFuture<Annotation>,
        mut annotation: Annotation,
    ) -> Result<()> {
        let expected = self.take_expected(
            future.capture,
            future.id,
            future.frame,
            FutureKind::Annotation,
            &annotation.definition,
        )?;
        annotation.frame = future.frame;
        if let Some(sensor) = expected.sensor {
            annotation.sensor = sensor;
        }
        if let Some(pending) = self.pending.get_mut(&future.frame) {
            pending.data.annotations.push(annotation);
        }
        self.complete_if_resolved(future.frame);
        self.flush_ready()
    }

    /// Resolves a metric future.
    pub fn report_metric_async(
        &mut self,
        future: AsyncFuture<Metric>,
        mut metric: Metric,
    ) -> Result<()> {
        let expected = self.take_expected(
            future.capture,
            future.id,
            future.frame,
            FutureKind::Metric,
            &metric.definition,
        )?;
        metric.frame = future.frame;
        if metric.sensor.is_none() {
            metric.sensor = expected.sensor;
        }
        if let Some(pending) = self.pending.get_mut(&future.frame) {
            pending.data.metrics.push(metric);
        }
        self.complete_if_resolved(future.frame);
        self.flush_ready()
    }

    /// Whether `future` still waits to be reported.
    pub fn is_pending<T>(&self, future: &AsyncFuture<T>) -> bool {
        future.capture == self.id
            && self
                .pending
                .get(&future.frame)
                .is_some_and(|p| p.outstanding.contains_key(&future.id))
    }

    /// Frames that still wait on at least one future.
    pub fn pending_frame_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending frame indices in ascending order.
    pub fn pending_frames(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.pending.keys().copied()
    }

    /// Writes completed frames to the endpoint.
    ///
    /// A frame the endpoint rejects stays queued with everything behind it,
    /// so calling this again retries from that frame.
    pub fn flush_ready(&mut self) -> Result<()> {
        while let Some(frame) = self.ready.front() {
            self.endpoint.write_frame(frame)?;
            debug!(frame = frame.frame, "frame written");
            self.ready.pop_front();
        }
        Ok(())
    }

    /// Releases `future`'s slot without reporting anything for it.
    ///
    /// The frame completes as if the slot had been reported, so a labeler
    /// that gives up on a frame does not hold it back forever.
    pub fn discard<T>(&mut self, future: AsyncFuture<T>) -> Result<()> {
        if future.capture != self.id {
            return Err(Error::Capture(format!(
                "future {} belongs to another capture",
                future.id
            )));
        }
        self.pending
            .get_mut(&future.frame)
            .and_then(|p| p.outstanding.remove(&future.id))
            .ok_or_else(|| {
                Error::Capture(format!(
                    "unknown future {} on frame {}",
                    future.id, future.frame
                ))
            })?;
        debug!(frame = future.frame, future = future.id, "future discarded");
        self.complete_if_resolved(future.frame);
        self.flush_ready()
    }

    /// Flushes what is complete and returns the endpoint.
    ///
    /// Frames still waiting on futures are dropped with a warning.
    pub fn finish(mut self) -> Result<E> {
        self.flush_ready()?;
        if !self.pending.is_empty() {
            warn!(
                frames = self.pending.len(),
                "capture finished with unresolved futures"
            );
        }
        Ok(self.endpoint)
    }

    fn reserve(
        &mut self,
        frame: FrameIndex,
        kind: FutureKind,
        definition: &str,
        sensor: Option<SensorId>,
    ) -> u64 {
        let id = self.next_future;
        self.next_future += 1;
        let pending = self.pending.entry(frame).or_insert_with(|| PendingFrame {
            outstanding: HashMap::new(),
            data: FrameData {
                frame,
                ..Default::default()
            },
        });
        pending.outstanding.insert(
            id,
            Expected {
                kind,
                definition: definition.to_owned(),
                sensor,
            },
        );
        id
    }

    /// Removes the expected slot and checks the report matches it.
    ///
    /// A mismatched report is dropped together with its slot, since the
    /// consumed handle can never be reported again. The rest of the frame
    /// still completes.
    fn take_expected(
        &mut self,
        capture: u64,
        id: u64,
        frame: FrameIndex,
        kind: FutureKind,
        definition: &str,
    ) -> Result<Expected> {
        if capture != self.id {
            return Err(Error::Capture(format!(
                "future {id} belongs to another capture"
            )));
        }
        let pending = self
            .pending
            .get_mut(&frame)
            .ok_or_else(|| Error::Capture(format!("unknown future {id} on frame {frame}")))?;
        let expected = pending
            .outstanding
            .remove(&id)
            .ok_or_else(|| Error::Capture(format!("unknown future {id} on frame {frame}")))?;
        let checked =
            check_kind(&expected, kind).and_then(|()| check_definition(&expected, definition));
        if let Err(err) = checked {
            warn!(frame, future = id, %err, "dropping mismatched report");
            self.complete_if_resolved(frame);
            if let Err(flush) = self.flush_ready() {
                warn!(frame, %flush, "endpoint rejected a frame; it stays queued");
            }
            return Err(err);
        }
        Ok(expected)
    }

    fn complete_if_resolved(&mut self, frame: FrameIndex) {
        if self
            .pending
            .get(&frame)
            .is_some_and(|p| p.outstanding.is_empty())
        {
            if let Some(done) = self.pending.remove(&frame) {
                self.ready.push_back(done.data);
            }
        }
    }
}

fn check_kind(expected: &Expected, kind: FutureKind) -> Result<()> {
    if expected.kind != kind {
        return Err(Error::Capture(format!(
            "future expects {:?}, got {kind:?}",
            expected.kind
        )));
    }
    Ok(())
}

fn check_definition(expected: &Expected, definition: &str) -> Result<()> {
    if expected.definition != definition {
        return Err(Error::Capture(format!(
            "future expects definition {}, got {definition}",
            expected.definition
        )));
    }
    Ok(())
}
