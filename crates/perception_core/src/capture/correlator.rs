//! Frame-keyed assembly of annotation parts that arrive out of order.
//!
//! A labeler schedules a future for a frame when rendering begins. The object
//! entries, the encoded image and the image dimensions then arrive from
//! separate callbacks in any order, each tagged with its frame. Whichever call
//! supplies the last missing piece gets the [`CompletedFrame`] back, and the
//! frame's record is dropped so it can never complete twice.
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::capture::datamodel::{Annotation, FrameIndex};
use crate::capture::encoding::EncodedImage;
use crate::capture::future::AsyncFuture;

/// All parts of one frame, ready to be reported.
#[derive(Debug)]
pub struct CompletedFrame<E> {
    pub frame: FrameIndex,
    pub future: AsyncFuture<Annotation>,
    pub entries: Vec<E>,
    pub image: EncodedImage,
    pub dimensions: (u32, u32),
}

/// Outcome of [`FrameCorrelator::schedule`].
#[derive(Debug)]
pub enum Scheduled<E> {
    /// The frame still waits for parts.
    Pending,
    /// Every part had already arrived.
    Completed(CompletedFrame<E>),
    /// The frame already had a future. The new one is handed back untouched
    /// so its slot can be discarded.
    Rejected(AsyncFuture<Annotation>),
}

struct PendingRecord<E> {
    future: Option<AsyncFuture<Annotation>>,
    entries: Option<Vec<E>>,
    image: Option<EncodedImage>,
    dimensions: Option<(u32, u32)>,
}

impl<E> Default for PendingRecord<E> {
    fn default() -> Self {
        Self {
            future: None,
            entries: None,
            image: None,
            dimensions: None,
        }
    }
}

impl<E> PendingRecord<E> {
    fn is_complete(&self) -> bool {
        self.future.is_some()
            && self.entries.is_some()
            && self.image.is_some()
            && self.dimensions.is_some()
    }

    fn into_completed(self, frame: FrameIndex) -> Option<CompletedFrame<E>> {
        Some(CompletedFrame {
            frame,
            future: self.future?,
            entries: self.entries?,
            image: self.image?,
            dimensions: self.dimensions?,
        })
    }
}

/// Pending per-frame records, keyed by frame index.
pub struct FrameCorrelator<E> {
    records: HashMap<FrameIndex, PendingRecord<E>>,
}

impl<E> Default for FrameCorrelator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> FrameCorrelator<E> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Registers the future that receives `frame`'s annotation.
    ///
    /// Parts delivered earlier are kept, so scheduling can itself complete the
    /// frame. The first future scheduled for a frame wins.
    pub fn schedule(
        &mut self,
        frame: FrameIndex,
        future: AsyncFuture<Annotation>,
    ) -> Scheduled<E> {
        let record = self.records.entry(frame).or_default();
        if record.future.is_some() {
            warn!(frame, "frame already scheduled; rejecting the new future");
            return Scheduled::Rejected(future);
        }
        record.future = Some(future);
        match self.take_if_complete(frame) {
            Some(done) => Scheduled::Completed(done),
            None => Scheduled::Pending,
        }
    }

    pub fn deliver_entries(
        &mut self,
        frame: FrameIndex,
        entries: Vec<E>,
    ) -> Option<CompletedFrame<E>> {
        let record = self.records.entry(frame).or_default();
        if record.entries.replace(entries).is_some() {
            debug!(frame, "entries delivered twice; keeping the latest");
        }
        self.take_if_complete(frame)
    }

    pub fn deliver_encoded_image(
        &mut self,
        frame: FrameIndex,
        image: EncodedImage,
    ) -> Option<CompletedFrame<E>> {
        let record = self.records.entry(frame).or_default();
        if record.image.replace(image).is_some() {
            debug!(frame, "image delivered twice; keeping the latest");
        }
        self.take_if_complete(frame)
    }

    pub fn deliver_dimensions(
        &mut self,
        frame: FrameIndex,
        width: u32,
        height: u32,
    ) -> Option<CompletedFrame<E>> {
        let record = self.records.entry(frame).or_default();
        if record.dimensions.replace((width, height)).is_some() {
            debug!(frame, "dimensions delivered twice; keeping the latest");
        }
        self.take_if_complete(frame)
    }

    /// Frames with a record that is not yet complete, ascending.
    pub fn pending_frames(&self) -> Vec<FrameIndex> {
        let mut frames: Vec<FrameIndex> = self.records.keys().copied().collect();
        frames.sort_unstable();
        frames
    }

    pub fn is_pending(&self, frame: FrameIndex) -> bool {
        self.records.contains_key(&frame)
    }

    /// Whether `frame` has a future waiting for its parts.
    pub fn is_scheduled(&self, frame: FrameIndex) -> bool {
        self.records.get(&frame).is_some_and(|r| r.future.is_some())
    }

    /// Drops `frame`'s record, returning its future if one was scheduled.
    pub fn discard(&mut self, frame: FrameIndex) -> Option<AsyncFuture<Annotation>> {
        let record = self.records.remove(&frame)?;
        debug!(frame, "discarded pending frame");
        record.future
    }

    fn take_if_complete(&mut self, frame: FrameIndex) -> Option<CompletedFrame<E>> {
        if !self.records.get(&frame)?.is_complete() {
            return None;
        }
        self.records.remove(&frame)?.into_completed(frame)
    }
}
