#![forbid(unsafe_code)]
//! perception_core: seeded domain randomization and frame-correlated capture for
//! synthetic dataset generation.
//!
//! Modules:
//! - rng: seed derivation and the deterministic xorshift generator
//! - sampler: constant, uniform, truncated normal and curve samplers
//! - parameter: typed parameters built from samplers, categorical selection
//! - tags: per-object tag registry with subclass queries
//! - randomizer: lifecycle hooks and the built-in randomizers
//! - scenario: iteration state machine driving randomizers
//! - sampling: Poisson disk point sampling
//! - capture: async annotation/metric futures, frame correlation, PNG encoding,
//!   segmentation and object count labelers, scenario metrics
//!
//! For examples and docs, see README and docs.rs.
pub mod capture;
pub mod error;
pub mod parameter;
pub mod randomizer;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod scenario;
pub mod tags;

/// Convenient re-exports for common types. Import with `use perception_core::prelude::*;`.
pub mod prelude {
    pub use crate::capture::{
        Annotation, AnnotationDefinition, AsyncFuture, ConsumerEndpoint, CountedLabel,
        DatasetCapture, FrameCorrelator, FrameData, FrameIndex, ImageEncoder, Metric,
        MetricDefinition, ObjectCountLabeler, PixelFormat, PixelReadback, ReportValue,
        ScenarioMetricsSink, SegmentationLabel, SemanticSegmentationLabeler, SensorId,
        VecEndpoint,
    };
    pub use crate::error::{Error, Result};
    pub use crate::parameter::{
        CategoricalParameter, CategoricalSpec, ColorHsva, ColorRgba, Parameter, ParameterSpec,
        ParameterValue,
    };
    pub use crate::randomizer::{
        HueOffsetRandomizer, HueOffsetRandomizerTag, NullTarget, ObjectPlacementRandomizer,
        Randomizer, RandomizerContext, RecordingTarget, RotationRandomizer,
        RotationRandomizerTag, SceneTarget, SunAngleRandomizer, SunAngleRandomizerTag,
    };
    pub use crate::rng::{random_from_index, seed_from_index, RandomState, DEFAULT_BASE_SEED};
    pub use crate::sampler::{AnimationCurve, FloatRange, Keyframe, Sampler, SamplerSpec};
    pub use crate::sampling::PoissonDiskSampling;
    pub use crate::scenario::{
        EventSink, FnSink, MultiSink, Scenario, ScenarioConfig, ScenarioEvent, ScenarioState,
        VecSink,
    };
    pub use crate::tags::{ObjectId, RandomizerTag, TagManager, TagType};
}
