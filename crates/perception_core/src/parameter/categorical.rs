//! Weighted selection from a list of options.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng::rand01;

/// Unvalidated categorical table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSpec<T> {
    pub options: Vec<T>,
    /// Relative weights, one per option. Ignored when `uniform` is set.
    pub probabilities: Vec<f32>,
    /// Pick every option with equal probability.
    pub uniform: bool,
}

impl<T> CategoricalSpec<T> {
    /// Options with equal probability.
    pub fn uniform(options: impl IntoIterator<Item = T>) -> Self {
        let options: Vec<T> = options.into_iter().collect();
        let probabilities = vec![1.0; options.len()];
        Self {
            options,
            probabilities,
            uniform: true,
        }
    }

    /// Options paired with relative weights.
    pub fn weighted(pairs: impl IntoIterator<Item = (T, f32)>) -> Self {
        let (options, probabilities): (Vec<T>, Vec<f32>) = pairs.into_iter().unzip();
        Self {
            options,
            probabilities,
            uniform: false,
        }
    }
}

impl<T: Clone + PartialEq> CategoricalSpec<T> {
    /// Validates the table and normalizes its probabilities.
    pub fn validate(&self) -> Result<CategoricalParameter<T>> {
        if self.options.is_empty() {
            return Err(Error::ParameterValidation("list of options is empty".into()));
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(Error::ParameterValidation(format!(
                    "duplicate option at index {i}"
                )));
            }
        }

        let cumulative = if self.uniform {
            let n = self.options.len() as f32;
            (1..=self.options.len()).map(|i| i as f32 / n).collect()
        } else {
            if self.probabilities.len() != self.options.len() {
                return Err(Error::ParameterValidation(format!(
                    "number of options ({}) must equal number of probabilities ({})",
                    self.options.len(),
                    self.probabilities.len()
                )));
            }
            normalize_cumulative(&self.probabilities)?
        };

        Ok(CategoricalParameter {
            options: self.options.clone(),
            cumulative,
            uniform: self.uniform,
        })
    }
}

fn normalize_cumulative(probabilities: &[f32]) -> Result<Vec<f32>> {
    let mut total = 0.0f32;
    for (i, &p) in probabilities.iter().enumerate() {
        if !p.is_finite() || p < 0.0 {
            return Err(Error::ParameterValidation(format!(
                "found invalid probability {p} at index {i}"
            )));
        }
        total += p;
    }
    if total <= 0.0 {
        return Err(Error::ParameterValidation(
            "total probability must be greater than 0".into(),
        ));
    }

    let mut sum = 0.0f32;
    let mut cumulative: Vec<f32> = probabilities
        .iter()
        .map(|p| {
            sum += p / total;
            sum
        })
        .collect();
    // Pin the tail so rounding cannot leave a gap below 1.
    if let Some(last_nonzero) = probabilities.iter().rposition(|&p| p > 0.0) {
        for c in &mut cumulative[last_nonzero..] {
            *c = 1.0;
        }
    }
    Ok(cumulative)
}

/// A validated categorical table.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalParameter<T> {
    options: Vec<T>,
    cumulative: Vec<f32>,
    uniform: bool,
}

impl<T> CategoricalParameter<T> {
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn option(&self, index: usize) -> Option<&T> {
        self.options.get(index)
    }

    /// Normalized probability of the option at `index`.
    pub fn probability(&self, index: usize) -> Option<f32> {
        let hi = *self.cumulative.get(index)?;
        let lo = if index == 0 {
            0.0
        } else {
            self.cumulative[index - 1]
        };
        Some(hi - lo)
    }

    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    /// Selects an option for the uniform draw `u` in [0, 1].
    pub fn select(&self, u: f32) -> Result<&T> {
        if self.uniform {
            let n = self.options.len();
            let index = ((u * n as f32) as usize).min(n - 1);
            return Ok(&self.options[index]);
        }
        // Strict comparison keeps zero-weight options unreachable, even for u = 0.
        let index = self.cumulative.iter().position(|&c| u < c).or_else(|| {
            (u >= 1.0)
                .then(|| (0..self.len()).rposition(|i| self.probability(i) > Some(0.0)))
                .flatten()
        });
        index
            .map(|i| &self.options[i])
            .ok_or_else(|| Error::Sampler(format!("no categorical option matched draw {u}")))
    }

    /// Draws one option.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Result<&T> {
        self.select(rand01(rng))
    }
}
