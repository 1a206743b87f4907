//! Color value types produced by color parameters.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in [0, 1].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Quantizes to 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// HSVA color. Hue is expressed in [0, 1] (one full turn).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorHsva {
    pub h: f32,
    pub s: f32,
    pub v: f32,
    pub a: f32,
}

impl ColorHsva {
    pub fn new(h: f32, s: f32, v: f32, a: f32) -> Self {
        Self { h, s, v, a }
    }

    /// Converts to RGBA, keeping alpha.
    pub fn to_rgba(self) -> ColorRgba {
        let s = self.s.clamp(0.0, 1.0);
        let v = self.v.clamp(0.0, 1.0);
        if s == 0.0 {
            return ColorRgba::new(v, v, v, self.a);
        }
        let h = self.h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        ColorRgba::new(r, g, b, self.a)
    }
}

impl From<ColorHsva> for ColorRgba {
    fn from(value: ColorHsva) -> Self {
        value.to_rgba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: ColorRgba, b: ColorRgba) -> bool {
        (a.r - b.r).abs() < 1e-5
            && (a.g - b.g).abs() < 1e-5
            && (a.b - b.b).abs() < 1e-5
            && (a.a - b.a).abs() < 1e-5
    }

    #[test]
    fn primary_hues_convert_to_primaries() {
        assert!(close(
            ColorHsva::new(0.0, 1.0, 1.0, 1.0).to_rgba(),
            ColorRgba::new(1.0, 0.0, 0.0, 1.0)
        ));
        assert!(close(
            ColorHsva::new(1.0 / 3.0, 1.0, 1.0, 0.5).to_rgba(),
            ColorRgba::new(0.0, 1.0, 0.0, 0.5)
        ));
        assert!(close(
            ColorHsva::new(2.0 / 3.0, 1.0, 1.0, 1.0).to_rgba(),
            ColorRgba::new(0.0, 0.0, 1.0, 1.0)
        ));
    }

    #[test]
    fn zero_saturation_is_gray() {
        let c = ColorHsva::new(0.42, 0.0, 0.3, 1.0).to_rgba();
        assert!(close(c, ColorRgba::new(0.3, 0.3, 0.3, 1.0)));
    }

    #[test]
    fn quantization_rounds_and_clamps() {
        assert_eq!(
            ColorRgba::new(1.2, 0.5, -0.1, 1.0).to_rgba8(),
            [255, 128, 0, 255]
        );
    }
}
