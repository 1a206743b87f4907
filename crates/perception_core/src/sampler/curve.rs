//! Piecewise-linear distribution curves and their integrated CDF.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of points used when integrating a curve.
pub const DEFAULT_INTEGRATION_RESOLUTION: usize = 100;

/// A point on a distribution curve.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Position on the value axis.
    pub time: f32,
    /// Relative probability at `time`. Must be non-negative.
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// A distribution curve: X is the sampled value, Y its relative probability.
///
/// Only the shape matters; heights do not need to peak at 1.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationCurve {
    pub keys: Vec<Keyframe>,
}

impl AnimationCurve {
    pub fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// Triangle peaking at 0.5 over [0, 1].
    pub fn triangle() -> Self {
        Self::new(vec![
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 1.0),
            Keyframe::new(1.0, 0.0),
        ])
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Evaluates the curve at `time`, clamping outside the key range.
    ///
    /// Keys are expected in ascending time order.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if time <= b.time {
                let span = b.time - a.time;
                if span <= 0.0 {
                    return b.value;
                }
                let t = (time - a.time) / span;
                return a.value + (b.value - a.value) * t;
            }
        }
        last.value
    }
}

/// Cumulative distribution of a curve, discretized at a fixed resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratedCurve {
    cdf: Vec<f32>,
    start: f32,
    end: f32,
    interval: f32,
}

impl IntegratedCurve {
    /// Integrates `curve` with the trapezoid rule into a normalized CDF.
    pub fn new(curve: &AnimationCurve, resolution: usize) -> Result<Self> {
        if curve.is_empty() {
            return Err(Error::SamplerValidation(
                "the distribution curve provided is empty".into(),
            ));
        }
        if resolution < 2 {
            return Err(Error::SamplerValidation(format!(
                "insufficient number of integration samples: {resolution}"
            )));
        }
        for (i, key) in curve.keys.iter().enumerate() {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(Error::SamplerValidation(format!(
                    "curve key {i} is not finite"
                )));
            }
            if key.value < 0.0 {
                return Err(Error::SamplerValidation(format!(
                    "curve key {i} has negative height {}",
                    key.value
                )));
            }
        }

        let mut sorted = curve.clone();
        sorted.keys.sort_by(|a, b| a.time.total_cmp(&b.time));

        let start = sorted.keys[0].time;
        let end = sorted.keys[sorted.keys.len() - 1].time;
        if end <= start {
            return Ok(Self {
                cdf: Vec::new(),
                start,
                end,
                interval: 0.0,
            });
        }

        let interval = (end - start) / (resolution - 1) as f32;
        let mut cdf = Vec::with_capacity(resolution);
        cdf.push(0.0f32);
        let mut prev = sorted.evaluate(start);
        for k in 1..resolution {
            let value = sorted.evaluate(start + interval * k as f32);
            let area = cdf[k - 1] + (prev + value) * 0.5 * interval;
            cdf.push(area);
            prev = value;
        }

        let total = cdf[resolution - 1];
        if total <= 0.0 {
            return Err(Error::SamplerValidation(
                "the distribution curve has zero area".into(),
            ));
        }
        for v in cdf.iter_mut() {
            *v /= total;
        }

        Ok(Self {
            cdf,
            start,
            end,
            interval,
        })
    }

    /// Inverse-transform sample for a uniform draw `u` in [0, 1].
    pub fn sample(&self, u: f32) -> f32 {
        if self.cdf.is_empty() || u <= 0.0 {
            return self.start;
        }
        match self.cdf.iter().position(|&c| c >= u) {
            Some(0) => self.start,
            Some(k) => {
                let lo = self.cdf[k - 1];
                let hi = self.cdf[k];
                let t = (u - lo) / (hi - lo);
                let left = self.start + self.interval * (k - 1) as f32;
                (left + t * self.interval).min(self.end)
            }
            None => self.end,
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn resolution(&self) -> usize {
        self.cdf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_interpolates_linearly_and_clamps() {
        let curve = AnimationCurve::triangle();
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert!((curve.evaluate(0.25) - 0.5).abs() < 1e-6);
        assert_eq!(curve.evaluate(0.5), 1.0);
        assert_eq!(curve.evaluate(2.0), 0.0);
    }

    #[test]
    fn empty_curve_and_low_resolution_are_rejected() {
        assert!(IntegratedCurve::new(&AnimationCurve::default(), 100).is_err());
        assert!(IntegratedCurve::new(&AnimationCurve::triangle(), 1).is_err());
    }

    #[test]
    fn negative_heights_are_rejected() {
        let curve = AnimationCurve::new(vec![Keyframe::new(0.0, 1.0), Keyframe::new(1.0, -0.1)]);
        let err = IntegratedCurve::new(&curve, 10).unwrap_err();
        assert!(matches!(err, Error::SamplerValidation(_)));
    }

    #[test]
    fn flat_zero_curve_has_no_area() {
        let curve = AnimationCurve::new(vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 0.0)]);
        assert!(IntegratedCurve::new(&curve, 10).is_err());
    }

    #[test]
    fn cdf_is_monotone_and_normalized() {
        let integrated = IntegratedCurve::new(&AnimationCurve::triangle(), 100).unwrap();
        assert_eq!(integrated.resolution(), 100);
        assert_eq!(integrated.cdf[0], 0.0);
        assert!((integrated.cdf[99] - 1.0).abs() < 1e-6);
        assert!(integrated.cdf.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn symmetric_curve_has_median_at_center() {
        let integrated = IntegratedCurve::new(&AnimationCurve::triangle(), 101).unwrap();
        assert!((integrated.sample(0.5) - 0.5).abs() < 1e-3);
        assert_eq!(integrated.sample(0.0), 0.0);
        assert!((integrated.sample(1.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn single_key_curve_collapses_to_its_time() {
        let curve = AnimationCurve::new(vec![Keyframe::new(3.0, 1.0)]);
        let integrated = IntegratedCurve::new(&curve, 10).unwrap();
        assert_eq!(integrated.sample(0.7), 3.0);
    }

    #[test]
    fn unsorted_keys_are_sorted_before_integration() {
        let curve = AnimationCurve::new(vec![
            Keyframe::new(1.0, 0.0),
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 1.0),
        ]);
        let integrated = IntegratedCurve::new(&curve, 101).unwrap();
        assert_eq!(integrated.start(), 0.0);
        assert_eq!(integrated.end(), 1.0);
    }
}
