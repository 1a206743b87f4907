//! Semantic segmentation labeler: per-frame PNG plus the labels visible in it.
use std::collections::HashSet;

use tracing::debug;

use crate::capture::correlator::{CompletedFrame, FrameCorrelator, Scheduled};
use crate::capture::datamodel::{
    Annotation, AnnotationDefinition, FrameIndex, ReportValue, SensorId,
};
use crate::capture::dataset::{ConsumerEndpoint, DatasetCapture};
use crate::capture::encoding::{ImageEncoder, PixelReadback};
use crate::error::{Error, Result};

pub const SEMANTIC_SEGMENTATION_ID: &str = "semantic segmentation";

const SEMANTIC_SEGMENTATION_DESCRIPTION: &str = "Generates a semantic segmentation image for each \
    captured frame. Each object is rendered using the color associated with its label. Images are \
    saved to the dataset in PNG format.";

/// A label and the pixel color it is rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationLabel {
    pub label: String,
    pub color: [u8; 4],
}

impl SegmentationLabel {
    pub fn new(label: impl Into<String>, color: [u8; 4]) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }

    fn to_report(&self) -> ReportValue {
        ReportValue::object([
            ("label_name", ReportValue::from(self.label.as_str())),
            (
                "pixel_value",
                ReportValue::from(self.color.map(u32::from)),
            ),
        ])
    }
}

/// Correlates object infos and readbacks per frame and reports one
/// annotation per frame once both arrived.
pub struct SemanticSegmentationLabeler {
    sensor: SensorId,
    definition: AnnotationDefinition,
    labels: Vec<SegmentationLabel>,
    correlator: FrameCorrelator<SegmentationLabel>,
    encoder: ImageEncoder,
}

impl SemanticSegmentationLabeler {
    /// Fails if two labels share a name or a color.
    ///
    /// Must be created on the thread that delivers readbacks.
    pub fn new(sensor: SensorId, labels: Vec<SegmentationLabel>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut colors = HashSet::new();
        for label in &labels {
            if !names.insert(label.label.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate segmentation label {}",
                    label.label
                )));
            }
            if !colors.insert(label.color) {
                return Err(Error::InvalidConfig(format!(
                    "segmentation color {:?} used by more than one label",
                    label.color
                )));
            }
        }
        Ok(Self {
            sensor,
            definition: AnnotationDefinition::new(
                SEMANTIC_SEGMENTATION_ID,
                SEMANTIC_SEGMENTATION_DESCRIPTION,
            ),
            labels,
            correlator: FrameCorrelator::new(),
            encoder: ImageEncoder::new(),
        })
    }

    pub fn definition(&self) -> &AnnotationDefinition {
        &self.definition
    }

    pub fn labels(&self) -> &[SegmentationLabel] {
        &self.labels
    }

    /// Frames still waiting for object infos or a readback.
    pub fn pending_frames(&self) -> Vec<FrameIndex> {
        self.correlator.pending_frames()
    }

    /// Reserves the frame's annotation. A frame that is already scheduled
    /// keeps its first reservation.
    pub fn on_begin_rendering<E: ConsumerEndpoint>(
        &mut self,
        frame: FrameIndex,
        capture: &mut DatasetCapture<E>,
    ) -> Result<()> {
        if self.correlator.is_scheduled(frame) {
            debug!(frame, "rendering began twice for the same frame");
            return Ok(());
        }
        let future = capture.report_annotation_async(frame, self.sensor.clone(), &self.definition);
        match self.correlator.schedule(frame, future) {
            Scheduled::Pending => Ok(()),
            Scheduled::Completed(done) => self.report(done, capture),
            Scheduled::Rejected(future) => capture.discard(future),
        }
    }

    /// Records which label colors appear on `frame`.
    pub fn on_object_infos<E: ConsumerEndpoint>(
        &mut self,
        frame: FrameIndex,
        present_colors: &[[u8; 4]],
        capture: &mut DatasetCapture<E>,
    ) -> Result<()> {
        let present: HashSet<[u8; 4]> = present_colors.iter().copied().collect();
        let entries: Vec<SegmentationLabel> = self
            .labels
            .iter()
            .filter(|l| present.contains(&l.color))
            .cloned()
            .collect();
        match self.correlator.deliver_entries(frame, entries) {
            Some(done) => self.report(done, capture),
            None => Ok(()),
        }
    }

    /// Records the readback's dimensions and its PNG encoding.
    pub fn on_readback<E: ConsumerEndpoint>(
        &mut self,
        readback: &PixelReadback,
        capture: &mut DatasetCapture<E>,
    ) -> Result<()> {
        let frame = readback.frame;
        if let Some(done) =
            self.correlator
                .deliver_dimensions(frame, readback.width, readback.height)
        {
            return self.report(done, capture);
        }
        let image = self.encoder.encode(readback)?;
        match self.correlator.deliver_encoded_image(frame, image) {
            Some(done) => self.report(done, capture),
            None => Ok(()),
        }
    }

    fn report<E: ConsumerEndpoint>(
        &self,
        done: CompletedFrame<SegmentationLabel>,
        capture: &mut DatasetCapture<E>,
    ) -> Result<()> {
        let (width, height) = done.dimensions;
        let values = ReportValue::object([
            ("format", ReportValue::from("PNG")),
            ("dimension", ReportValue::from([width, height])),
            (
                "instances",
                ReportValue::Array(
                    done.entries
                        .iter()
                        .map(SegmentationLabel::to_report)
                        .collect(),
                ),
            ),
            ("image_size", ReportValue::from(done.image.len())),
        ]);
        debug!(frame = done.frame, instances = done.entries.len(), "segmentation complete");
        let annotation = Annotation::new(&self.definition, self.sensor.clone(), done.frame, values);
        capture.report_annotation(done.future, annotation)
    }
}
