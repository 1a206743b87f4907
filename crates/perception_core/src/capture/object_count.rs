//! Object count labeler: how many visible objects carry each label, per frame.
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::capture::datamodel::{FrameIndex, Metric, MetricDefinition, ReportValue, SensorId};
use crate::capture::dataset::{ConsumerEndpoint, DatasetCapture};
use crate::capture::future::AsyncFuture;
use crate::error::{Error, Result};

pub const OBJECT_COUNT_ID: &str = "object count";

const OBJECT_COUNT_DESCRIPTION: &str = "Counts of objects for each label in the sensor's view";

/// A label id reported by the host's object infos, and its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedLabel {
    pub id: u32,
    pub name: String,
}

impl CountedLabel {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Reports one metric per frame with a count for every configured label,
/// zero counts included, in configuration order.
pub struct ObjectCountLabeler {
    sensor: SensorId,
    definition: MetricDefinition,
    labels: Vec<CountedLabel>,
    index: HashMap<u32, usize>,
    scheduled: HashMap<FrameIndex, AsyncFuture<Metric>>,
}

impl ObjectCountLabeler {
    /// Fails if two labels share an id or a name.
    pub fn new(sensor: SensorId, labels: Vec<CountedLabel>) -> Result<Self> {
        let mut index = HashMap::with_capacity(labels.len());
        let mut names = HashSet::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.id, i).is_some() {
                return Err(Error::InvalidConfig(format!(
                    "label id {} used by more than one label",
                    label.id
                )));
            }
            if !names.insert(label.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate object count label {}",
                    label.name
                )));
            }
        }
        Ok(Self {
            sensor,
            definition: MetricDefinition::new(OBJECT_COUNT_ID, OBJECT_COUNT_DESCRIPTION),
            labels,
            index,
            scheduled: HashMap::new(),
        })
    }

    pub fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    pub fn labels(&self) -> &[CountedLabel] {
        &self.labels
    }

    /// Frames whose object infos have not arrived yet, ascending.
    pub fn pending_frames(&self) -> Vec<FrameIndex> {
        let mut frames: Vec<FrameIndex> = self.scheduled.keys().copied().collect();
        frames.sort_unstable();
        frames
    }

    /// Reserves the frame's count metric. A frame already reserved keeps its
    /// first reservation.
    pub fn on_begin_rendering<E: ConsumerEndpoint>(
        &mut self,
        frame: FrameIndex,
        capture: &mut DatasetCapture<E>,
    ) {
        if self.scheduled.contains_key(&frame) {
            debug!(frame, "rendering began twice for the same frame");
            return;
        }
        let future =
            capture.create_async_metric(frame, &self.definition, Some(self.sensor.clone()));
        self.scheduled.insert(frame, future);
    }

    /// Counts `label_ids`, one entry per visible object, and reports the
    /// frame's metric.
    ///
    /// Ids with no configured label are skipped. Infos for a frame that was
    /// never scheduled are ignored.
    pub fn on_object_infos<E: ConsumerEndpoint>(
        &mut self,
        frame: FrameIndex,
        label_ids: &[u32],
        capture: &mut DatasetCapture<E>,
    ) -> Result<()> {
        let Some(future) = self.scheduled.remove(&frame) else {
            debug!(frame, "object infos for an unscheduled frame");
            return Ok(());
        };
        let mut counts = vec![0u64; self.labels.len()];
        for id in label_ids {
            if let Some(&i) = self.index.get(id) {
                counts[i] += 1;
            }
        }
        let values: Vec<ReportValue> = self
            .labels
            .iter()
            .zip(&counts)
            .map(|(label, &count)| {
                ReportValue::object([
                    ("label_id", ReportValue::from(label.id)),
                    ("label_name", ReportValue::from(label.name.as_str())),
                    ("count", ReportValue::Int(count as i64)),
                ])
            })
            .collect();
        debug!(frame, objects = label_ids.len(), "object count complete");
        let metric = Metric::new(&self.definition, Some(self.sensor.clone()), frame, values);
        capture.report_metric_async(future, metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::dataset::VecEndpoint;

    fn labeler() -> ObjectCountLabeler {
        ObjectCountLabeler::new(
            "camera".into(),
            vec![CountedLabel::new(1, "car"), CountedLabel::new(2, "person")],
        )
        .unwrap()
    }

    fn counts(metric: &Metric) -> Vec<(String, i64)> {
        metric
            .values
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| {
                let name = entry.get("label_name").and_then(ReportValue::as_str).unwrap();
                let count = entry.get("count").and_then(ReportValue::as_i64).unwrap();
                (name.to_owned(), count)
            })
            .collect()
    }

    #[test]
    fn counts_every_label_including_absent_ones() {
        let mut capture = DatasetCapture::new(VecEndpoint::new());
        let mut labeler = labeler();
        labeler.on_begin_rendering(0, &mut capture);
        labeler.on_begin_rendering(1, &mut capture);
        assert_eq!(labeler.pending_frames(), vec![0, 1]);

        labeler.on_object_infos(1, &[2, 2, 9], &mut capture).unwrap();
        labeler.on_object_infos(0, &[1, 2, 1, 1], &mut capture).unwrap();
        assert!(labeler.pending_frames().is_empty());

        let frames = capture.finish().unwrap().into_inner();
        assert_eq!(frames[0].frame, 1);
        let metric = &frames[0].metrics[0];
        assert_eq!(metric.definition, OBJECT_COUNT_ID);
        assert_eq!(metric.sensor, Some(SensorId::from("camera")));
        assert_eq!(
            counts(metric),
            vec![("car".to_owned(), 0), ("person".to_owned(), 2)]
        );
        assert_eq!(
            counts(&frames[1].metrics[0]),
            vec![("car".to_owned(), 3), ("person".to_owned(), 1)]
        );
        let first = &frames[1].metrics[0].values.as_array().unwrap()[0];
        assert_eq!(first.get("label_id").and_then(ReportValue::as_i64), Some(1));
    }

    #[test]
    fn unscheduled_frames_are_ignored() {
        let mut capture = DatasetCapture::new(VecEndpoint::new());
        let mut labeler = labeler();
        labeler.on_object_infos(4, &[1], &mut capture).unwrap();
        assert!(capture.endpoint().frames().is_empty());
        assert_eq!(capture.pending_frame_count(), 0);
    }

    #[test]
    fn rendering_twice_reserves_one_metric() {
        let mut capture = DatasetCapture::new(VecEndpoint::new());
        let mut labeler = labeler();
        labeler.on_begin_rendering(3, &mut capture);
        labeler.on_begin_rendering(3, &mut capture);
        labeler.on_object_infos(3, &[1], &mut capture).unwrap();
        assert_eq!(capture.pending_frame_count(), 0);
        assert_eq!(capture.endpoint().frames()[0].metrics.len(), 1);
    }

    #[test]
    fn duplicate_ids_or_names_are_rejected() {
        let same_id = ObjectCountLabeler::new(
            "camera".into(),
            vec![CountedLabel::new(1, "car"), CountedLabel::new(1, "truck")],
        );
        assert!(matches!(same_id, Err(Error::InvalidConfig(_))));
        let same_name = ObjectCountLabeler::new(
            "camera".into(),
            vec![CountedLabel::new(1, "car"), CountedLabel::new(2, "car")],
        );
        assert!(same_name.is_err());
    }
}
