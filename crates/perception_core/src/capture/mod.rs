//! Dataset capture: annotations and metrics that resolve asynchronously, per frame.
//!
//! - [`DatasetCapture`] hands out [`AsyncFuture`]s and forwards a frame to its
//!   [`ConsumerEndpoint`] once every future on it has been reported.
//! - [`FrameCorrelator`] collects the independently arriving parts of a
//!   labeler's frame and yields them together exactly once.
//! - [`ImageEncoder`] turns pixel readbacks into PNG on the main thread.
//! - [`SemanticSegmentationLabeler`] ties the pieces together.
//! - [`ObjectCountLabeler`] reports per-label object counts as a metric.
//! - [`ScenarioMetricsSink`] records a scenario's seed and iterations.
//!
//! All of this is single-threaded and driven by host callbacks.
pub mod correlator;
pub mod datamodel;
pub mod dataset;
pub mod encoding;
pub mod future;
pub mod labeler;
pub mod object_count;
pub mod scenario_metrics;

pub use correlator::{CompletedFrame, FrameCorrelator, Scheduled};
pub use datamodel::{
    Annotation, AnnotationDefinition, FrameIndex, Metric, MetricDefinition, ReportValue, SensorId,
};
pub use dataset::{ConsumerEndpoint, DatasetCapture, FrameData, VecEndpoint};
pub use encoding::{EncodedImage, ImageEncoder, MainThreadGuard, PixelFormat, PixelReadback};
pub use future::{AsyncFuture, FutureKind};
pub use labeler::{SegmentationLabel, SemanticSegmentationLabeler, SEMANTIC_SEGMENTATION_ID};
pub use object_count::{CountedLabel, ObjectCountLabeler, OBJECT_COUNT_ID};
pub use scenario_metrics::{
    ScenarioMetricsSink, RANDOM_SEED_METRIC_ID, SCENARIO_ITERATION_METRIC_ID,
};
