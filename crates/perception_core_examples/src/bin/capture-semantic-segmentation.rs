use perception_core::prelude::*;

const ROAD: [u8; 4] = [128, 64, 128, 255];
const CAR: [u8; 4] = [0, 0, 142, 255];
const PERSON: [u8; 4] = [220, 20, 60, 255];

/// Logs each completed frame instead of writing a dataset.
#[derive(Default)]
struct LogEndpoint {
    frames: usize,
}

impl ConsumerEndpoint for LogEndpoint {
    fn write_frame(&mut self, frame: &FrameData) -> perception_core::error::Result<()> {
        for annotation in &frame.annotations {
            let instances = annotation
                .values
                .get("instances")
                .and_then(ReportValue::as_array)
                .map_or(0, <[_]>::len);
            tracing::info!(
                frame = frame.frame,
                sensor = %annotation.sensor,
                instances,
                metrics = frame.metrics.len(),
                "frame written"
            );
        }
        self.frames += 1;
        Ok(())
    }
}

/// A striped frame: road everywhere, plus cars and people on some frames.
fn readback(frame: FrameIndex, width: u32, height: u32) -> (PixelReadback, Vec<[u8; 4]>) {
    let mut present = vec![ROAD];
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for _ in 0..width {
            let color = match (y * 4 / height, frame % 3) {
                (1, 0) | (1, 2) => CAR,
                (2, 1) | (2, 2) => PERSON,
                _ => ROAD,
            };
            if !present.contains(&color) {
                present.push(color);
            }
            data.extend_from_slice(&color);
        }
    }
    let readback = PixelReadback {
        frame,
        width,
        height,
        format: PixelFormat::Rgba8,
        data,
    };
    (readback, present)
}

/// One object per visible car or person color.
fn label_ids(present: &[[u8; 4]]) -> Vec<u32> {
    present
        .iter()
        .filter_map(|&color| match color {
            CAR => Some(1),
            PERSON => Some(2),
            _ => None,
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    perception_core_examples::init_tracing();

    let mut capture = DatasetCapture::new(LogEndpoint::default());
    let mut labeler = SemanticSegmentationLabeler::new(
        SensorId::from("camera"),
        vec![
            SegmentationLabel::new("road", ROAD),
            SegmentationLabel::new("car", CAR),
            SegmentationLabel::new("person", PERSON),
        ],
    )?;
    let mut counter = ObjectCountLabeler::new(
        SensorId::from("camera"),
        vec![CountedLabel::new(1, "car"), CountedLabel::new(2, "person")],
    )?;
    let timing = MetricDefinition::new("render time", "milliseconds spent rendering");

    let frames: Vec<FrameIndex> = (0..6).collect();
    for &frame in &frames {
        labeler.on_begin_rendering(frame, &mut capture)?;
        counter.on_begin_rendering(frame, &mut capture);
        capture.report_metric(
            frame,
            Metric::new(&timing, Some(SensorId::from("camera")), frame, 16.6),
        )?;
    }

    // Readbacks come back in reverse, object infos in order.
    let mut parts: Vec<(PixelReadback, Vec<[u8; 4]>)> =
        frames.iter().map(|&f| readback(f, 64, 48)).collect();
    for (readback, _) in parts.iter().rev() {
        labeler.on_readback(readback, &mut capture)?;
    }
    for (readback, present) in parts.drain(..) {
        labeler.on_object_infos(readback.frame, &present, &mut capture)?;
        counter.on_object_infos(readback.frame, &label_ids(&present), &mut capture)?;
    }

    anyhow::ensure!(labeler.pending_frames().is_empty(), "frames left pending");
    anyhow::ensure!(counter.pending_frames().is_empty(), "counts left pending");
    let endpoint = capture.finish()?;
    tracing::info!(frames = endpoint.frames, "capture finished");
    Ok(())
}
