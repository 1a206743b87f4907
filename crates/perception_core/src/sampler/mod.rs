//! Scalar samplers.
//!
//! Samplers are authored as a [`SamplerSpec`] and turned into a ready-to-use
//! [`Sampler`] by [`SamplerSpec::validate`]. Configuration problems surface there,
//! never while sampling. A validated sampler holds no mutable state: every draw takes
//! its randomness from the RNG passed in.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng::rand01;

pub mod curve;
pub mod normal;

pub use curve::{AnimationCurve, IntegratedCurve, Keyframe, DEFAULT_INTEGRATION_RESOLUTION};
pub use normal::{normal_cdf, normal_cdf_inverse, truncated_normal_sample};

/// Inclusive value range.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    pub minimum: f32,
    pub maximum: f32,
}

impl FloatRange {
    pub fn new(minimum: f32, maximum: f32) -> Self {
        Self { minimum, maximum }
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.minimum..=self.maximum).contains(&value)
    }

    /// Validates that the range is finite and ordered.
    pub fn validate(&self) -> Result<()> {
        if !self.minimum.is_finite() || !self.maximum.is_finite() {
            return Err(Error::SamplerValidation(format!(
                "range [{}, {}] is not finite",
                self.minimum, self.maximum
            )));
        }
        if self.minimum > self.maximum {
            return Err(Error::SamplerValidation(format!(
                "range minimum {} is greater than maximum {}",
                self.minimum, self.maximum
            )));
        }
        Ok(())
    }
}

impl Default for FloatRange {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Unvalidated sampler configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SamplerSpec {
    Constant {
        /// Value returned by every draw.
        value: f32,
    },
    Uniform {
        /// Range to interpolate over.
        range: FloatRange,
    },
    Normal {
        /// Truncation range.
        range: FloatRange,
        /// Mean of the untruncated distribution.
        mean: f32,
        /// Standard deviation of the untruncated distribution.
        std_dev: f32,
    },
    AnimationCurve {
        /// Probability shape over the value axis.
        curve: AnimationCurve,
        /// Number of integration points for the CDF.
        resolution: usize,
    },
}

impl SamplerSpec {
    pub fn constant(value: f32) -> Self {
        SamplerSpec::Constant { value }
    }

    pub fn uniform(min: f32, max: f32) -> Self {
        SamplerSpec::Uniform {
            range: FloatRange::new(min, max),
        }
    }

    pub fn normal(min: f32, max: f32, mean: f32, std_dev: f32) -> Self {
        SamplerSpec::Normal {
            range: FloatRange::new(min, max),
            mean,
            std_dev,
        }
    }

    pub fn curve(curve: AnimationCurve) -> Self {
        SamplerSpec::AnimationCurve {
            curve,
            resolution: DEFAULT_INTEGRATION_RESOLUTION,
        }
    }

    /// Checks the configuration and builds the sampler.
    pub fn validate(&self) -> Result<Sampler> {
        match self {
            SamplerSpec::Constant { value } => {
                if !value.is_finite() {
                    return Err(Error::SamplerValidation(format!(
                        "constant value {value} is not finite"
                    )));
                }
                Ok(Sampler::Constant(*value))
            }
            SamplerSpec::Uniform { range } => {
                range.validate()?;
                Ok(Sampler::Uniform(*range))
            }
            SamplerSpec::Normal {
                range,
                mean,
                std_dev,
            } => {
                range.validate()?;
                if !mean.is_finite() {
                    return Err(Error::SamplerValidation(format!(
                        "mean {mean} is not finite"
                    )));
                }
                if !std_dev.is_finite() || *std_dev < 0.0 {
                    return Err(Error::SamplerValidation(format!(
                        "standard deviation {std_dev} must be finite and >= 0"
                    )));
                }
                Ok(Sampler::Normal {
                    range: *range,
                    mean: *mean,
                    std_dev: *std_dev,
                })
            }
            SamplerSpec::AnimationCurve { curve, resolution } => Ok(Sampler::AnimationCurve(
                IntegratedCurve::new(curve, *resolution)?,
            )),
        }
    }
}

impl Default for SamplerSpec {
    fn default() -> Self {
        SamplerSpec::uniform(0.0, 1.0)
    }
}

/// A validated sampler.
#[derive(Debug, Clone, PartialEq)]
pub enum Sampler {
    Constant(f32),
    Uniform(FloatRange),
    Normal {
        range: FloatRange,
        mean: f32,
        std_dev: f32,
    },
    AnimationCurve(IntegratedCurve),
}

impl Sampler {
    /// Draws one value.
    pub fn sample(&self, rng: &mut dyn RngCore) -> f32 {
        match self {
            Sampler::Constant(value) => *value,
            Sampler::Uniform(range) => {
                let u = rand01(rng);
                (range.minimum + (range.maximum - range.minimum) * u)
                    .clamp(range.minimum, range.maximum)
            }
            Sampler::Normal {
                range,
                mean,
                std_dev,
            } => truncated_normal_sample(rand01(rng), range.minimum, range.maximum, *mean, *std_dev),
            Sampler::AnimationCurve(integrated) => integrated.sample(rand01(rng)),
        }
    }

    /// Draws `count` values from the same generator.
    pub fn samples(&self, rng: &mut dyn RngCore, count: usize) -> Vec<f32> {
        (0..count).map(|_| self.sample(rng)).collect()
    }

    /// Whether draws consume randomness.
    pub fn is_random(&self) -> bool {
        !matches!(self, Sampler::Constant(_))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::rng::RandomState;

    #[test]
    fn uniform_samples_stay_in_range() {
        let sampler = SamplerSpec::uniform(-3.0, 7.5).validate().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for v in sampler.samples(&mut rng, 10_000) {
            assert!((-3.0..=7.5).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn degenerate_uniform_range_returns_the_bound() {
        let sampler = SamplerSpec::uniform(2.0, 2.0).validate().unwrap();
        let mut rng = RandomState::new(5).unwrap();
        assert_eq!(sampler.sample(&mut rng), 2.0);
    }

    #[test]
    fn truncated_normal_never_escapes_its_range() {
        let sampler = SamplerSpec::normal(-1.0, 2.0, 0.5, 3.0).validate().unwrap();
        let mut rng = RandomState::new(2024).unwrap();
        for _ in 0..10_000 {
            let v = sampler.sample(&mut rng);
            assert!((-1.0..=2.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn normal_mean_is_close_to_configured_mean() {
        let sampler = SamplerSpec::normal(-100.0, 100.0, 4.0, 1.0)
            .validate()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let draws = sampler.samples(&mut rng, 10_000);
        let mean = draws.iter().sum::<f32>() / draws.len() as f32;
        assert!((mean - 4.0).abs() < 0.1, "mean was {mean}");
    }

    #[test]
    fn constant_ignores_rng() {
        let sampler = SamplerSpec::constant(0.25).validate().unwrap();
        let mut rng = RandomState::new(77).unwrap();
        let before = rng.clone();
        assert_eq!(sampler.sample(&mut rng), 0.25);
        assert_eq!(rng, before);
        assert!(!sampler.is_random());
    }

    #[test]
    fn invalid_configurations_fail_validation() {
        assert!(matches!(
            SamplerSpec::uniform(1.0, 0.0).validate(),
            Err(Error::SamplerValidation(_))
        ));
        assert!(SamplerSpec::normal(0.0, 1.0, 0.5, -1.0).validate().is_err());
        assert!(SamplerSpec::constant(f32::NAN).validate().is_err());
        assert!(SamplerSpec::curve(AnimationCurve::default())
            .validate()
            .is_err());
    }

    #[test]
    fn curve_sampler_follows_curve_shape() {
        // All mass in the upper half.
        let curve = AnimationCurve::new(vec![
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 0.0),
            Keyframe::new(0.6, 1.0),
            Keyframe::new(1.0, 1.0),
        ]);
        let sampler = SamplerSpec::curve(curve).validate().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for v in sampler.samples(&mut rng, 2_000) {
            assert!((0.49..=1.0).contains(&v), "{v} drawn from empty region");
        }
    }

    #[test]
    fn same_seed_same_samples() {
        let sampler = SamplerSpec::uniform(0.0, 10.0).validate().unwrap();
        let mut a = RandomState::new(31).unwrap();
        let mut b = RandomState::new(31).unwrap();
        assert_eq!(sampler.samples(&mut a, 32), sampler.samples(&mut b, 32));
    }
}
