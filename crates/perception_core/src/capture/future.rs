//! Handles to annotations and metrics that will be reported later.
use std::fmt;
use std::marker::PhantomData;

use crate::capture::datamodel::FrameIndex;

/// What a pending future resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FutureKind {
    Annotation,
    Metric,
}

/// A slot for a `T` that a [`DatasetCapture`](crate::capture::DatasetCapture)
/// expects on `frame`.
///
/// Futures are move-only. Reporting consumes the handle, so each one resolves
/// at most once.
pub struct AsyncFuture<T> {
    pub(crate) id: u64,
    pub(crate) capture: u64,
    pub(crate) frame: FrameIndex,
    _kind: PhantomData<fn() -> T>,
}

impl<T> AsyncFuture<T> {
    pub(crate) fn new(capture: u64, id: u64, frame: FrameIndex) -> Self {
        Self {
            id,
            capture,
            frame,
            _kind: PhantomData,
        }
    }

    /// Frame the future belongs to.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> fmt::Debug for AsyncFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFuture")
            .field("id", &self.id)
            .field("frame", &self.frame)
            .field("kind", &std::any::type_name::<T>())
            .finish()
    }
}
