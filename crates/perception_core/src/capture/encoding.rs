//! PNG encoding of pixel readbacks.
use std::io::Cursor;
use std::thread::{self, ThreadId};

use image::{ExtendedColorType, ImageFormat};
use tracing::debug;

use crate::capture::datamodel::FrameIndex;
use crate::error::{Error, Result};

/// Remembers the thread it was created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainThreadGuard {
    thread: ThreadId,
}

impl MainThreadGuard {
    /// Binds the guard to the calling thread.
    pub fn new() -> Self {
        Self {
            thread: thread::current().id(),
        }
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Fails with [`Error::WrongThread`] unless called on the creating thread.
    pub fn check(&self) -> Result<()> {
        let actual = thread::current().id();
        if actual != self.thread {
            return Err(Error::WrongThread {
                expected: self.thread,
                actual,
            });
        }
        Ok(())
    }
}

impl Default for MainThreadGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout of a readback buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    Rgb8,
    /// Single 8-bit channel.
    R8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::R8 => 1,
        }
    }

    fn color_type(self) -> ExtendedColorType {
        match self {
            PixelFormat::Rgba8 => ExtendedColorType::Rgba8,
            PixelFormat::Rgb8 => ExtendedColorType::Rgb8,
            PixelFormat::R8 => ExtendedColorType::L8,
        }
    }
}

/// Pixels read back from a rendered frame, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelReadback {
    pub frame: FrameIndex,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl PixelReadback {
    fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.format.bytes_per_pixel())
    }

    /// The RGBA value of pixel `(x, y)`, widening narrower formats.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        let px = self.data.get(start..start + bpp)?;
        Some(match self.format {
            PixelFormat::Rgba8 => [px[0], px[1], px[2], px[3]],
            PixelFormat::Rgb8 => [px[0], px[1], px[2], u8::MAX],
            PixelFormat::R8 => [px[0], 0, 0, u8::MAX],
        })
    }
}

/// A PNG image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Encodes readbacks to PNG on the thread it was created on.
#[derive(Debug, Default, Clone)]
pub struct ImageEncoder {
    guard: MainThreadGuard,
}

impl ImageEncoder {
    pub fn new() -> Self {
        Self {
            guard: MainThreadGuard::new(),
        }
    }

    pub fn encode(&self, readback: &PixelReadback) -> Result<EncodedImage> {
        self.guard.check()?;
        let expected = readback.expected_len().ok_or_else(|| {
            Error::Capture(format!(
                "readback of {}x{} pixels is too large",
                readback.width, readback.height
            ))
        })?;
        if readback.data.len() != expected {
            return Err(Error::Capture(format!(
                "readback for frame {} holds {} bytes, expected {expected} for {}x{} {:?}",
                readback.frame,
                readback.data.len(),
                readback.width,
                readback.height,
                readback.format
            )));
        }

        let mut out = Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut out,
            &readback.data,
            readback.width,
            readback.height,
            readback.format.color_type(),
            ImageFormat::Png,
        )?;
        let data = out.into_inner();
        debug!(frame = readback.frame, bytes = data.len(), "encoded readback");
        Ok(EncodedImage {
            width: readback.width,
            height: readback.height,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readback(format: PixelFormat, width: u32, height: u32) -> PixelReadback {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        PixelReadback {
            frame: 1,
            width,
            height,
            format,
            data: (0..len).map(|i| (i % 251) as u8).collect(),
        }
    }

    #[test]
    fn encodes_every_format_as_png() {
        let encoder = ImageEncoder::new();
        for format in [PixelFormat::Rgba8, PixelFormat::Rgb8, PixelFormat::R8] {
            let encoded = encoder.encode(&readback(format, 5, 3)).unwrap();
            assert!(encoded.data.starts_with(&[0x89, b'P', b'N', b'G']));
            let decoded = image::load_from_memory(&encoded.data).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (5, 3));
        }
    }

    #[test]
    fn buffer_size_is_checked() {
        let mut bad = readback(PixelFormat::Rgba8, 4, 4);
        bad.data.pop();
        assert!(matches!(
            ImageEncoder::new().encode(&bad),
            Err(Error::Capture(_))
        ));
    }

    #[test]
    fn encoding_off_the_main_thread_fails() {
        let encoder = ImageEncoder::new();
        let input = readback(PixelFormat::R8, 2, 2);
        let result = thread::spawn(move || encoder.encode(&input)).join().unwrap();
        assert!(matches!(result, Err(Error::WrongThread { .. })));
    }

    #[test]
    fn pixels_widen_to_rgba() {
        let rgb = PixelReadback {
            frame: 0,
            width: 2,
            height: 1,
            format: PixelFormat::Rgb8,
            data: vec![1, 2, 3, 4, 5, 6],
        };
        assert_eq!(rgb.pixel(1, 0), Some([4, 5, 6, 255]));
        assert_eq!(rgb.pixel(2, 0), None);
    }
}
